//! SFCA Derivation Pipeline
//!
//! Turns a raw incident table into the published artifact set.
//!
//! # Stages
//!
//! - [`resolve_time_axis`]: canonical `month` from the first present time source
//! - [`aggregate`] / [`AggregateSpec`]: sorted, sparse group counts
//! - [`ConsistencyChecker`]: cross-view integrity, a hard gate before publishing
//! - [`DerivationRun`]: the whole batch, configured by [`PipelineConfig`]
//!
//! # Example
//!
//! ```rust,ignore
//! use sfca_pipeline::{derive_from_paths, PipelineConfig};
//!
//! let config = PipelineConfig::load("sfca.toml")?.with_artifacts_dir("out");
//! let report = derive_from_paths(&config)?;
//! println!("published {} artifacts", report.published.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod aggregate;
mod config;
mod consistency;
mod derive;
mod error;
mod time_axis;
mod view;

pub use aggregate::{
    aggregate, citywide_monthly, explode, hourly_weekday,
    neighborhood_category_monthly, AggregateSpec,
};
pub use config::{DeriveConfig, PathsConfig, PipelineConfig, DEFAULT_ARTIFACTS_DIR};
pub use consistency::{rederive_citywide, ArtifactSet, ConsistencyChecker};
pub use derive::{derive_from_paths, DerivationReport, DerivationRun, RAW_INPUT};
pub use error::{ConfigError, ConsistencyError, NormalizeError, PipelineError, PipelineResult};
pub use time_axis::{resolve_time_axis, Resolved, TimeSource, MONTH};
pub use view::{View, HOURLY_RAW_COLUMNS, MONTHLY_RAW_COLUMNS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
