//! SFCA Artifact System
//!
//! Typed tabular artifacts with schema validation and type normalization.
//!
//! # Core Concepts
//!
//! - [`Table`] / [`Value`]: ordered columns over typed cells
//! - [`SchemaValidator`]: required-column contract, identical on write and read
//! - [`Normalizer`]: table-driven coercion with a [`DropAudit`] of lost rows
//! - [`ArtifactKind`]: sealed trait describing each derived view
//! - [`Artifact<K>`]: validated table plus its [`ContentHash`]
//!
//! # Example
//!
//! ```rust,ignore
//! use sfca_artifact::{Artifact, types::CitywideMonthly};
//!
//! // Stored tables come back as text; the load path re-validates them
//! let (artifact, audit) = Artifact::<CitywideMonthly>::from_stored(&table)?;
//! println!("{} rows, {} dropped", artifact.len(), audit.dropped());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod artifact;
mod error;
mod hash;
mod normalize;
mod schema;
mod table;

pub mod time;
pub mod types;

// Re-exports
pub use artifact::{Artifact, ArtifactKind, DynArtifactRef};
pub use error::ArtifactError;
pub use hash::{ContentHash, HashError};
pub use normalize::{DropAudit, Normalized, Normalizer};
pub use schema::{validate_columns, ColumnKind, ColumnRule, SchemaValidator};
pub use table::{Table, Value, DATE_FORMAT, TIMESTAMP_FORMAT};
pub use types::{CitywideMonthly, Forecast, HourWeekday, NeighborhoodCategoryMonthly, INCIDENTS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
