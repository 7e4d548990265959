//! Error types for the derivation pipeline
//!
//! Shape errors abort the run; per-row coercion failures never reach here.

use chrono::NaiveDate;
use sfca_artifact::ArtifactError;
use sfca_store::{LoadError, StoreError};
use std::path::PathBuf;

/// Errors resolving the time axis
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// None of `year_month`, `month`, `incident_datetime` is present
    #[error("no time source column; available columns: {available:?}")]
    NoTimeSource { available: Vec<String> },

    /// Input table is malformed
    #[error("malformed input table: {0}")]
    Table(#[from] ArtifactError),
}

/// Cross-artifact integrity failures
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConsistencyError {
    /// Citywide total differs from the neighborhood×category total
    #[error(
        "inconsistent aggregates for {month}: neighborhood×category sums to {expected}, citywide has {actual}"
    )]
    InconsistentAggregates {
        month: NaiveDate,
        expected: i64,
        actual: i64,
    },

    /// Forecast does not start the month after the last historical month
    #[error("forecast misaligned: last historical month {last_historical}, first forecast month {first_forecast}")]
    ForecastMisaligned {
        last_historical: NaiveDate,
        first_forecast: NaiveDate,
    },

    /// A month's incident total does not fit in an `i64`
    #[error("{artifact}: incident total for {month} overflows")]
    CountOverflow {
        artifact: &'static str,
        month: NaiveDate,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown view '{0}'")]
    UnknownView(String),

    #[error("no raw input configured")]
    MissingRaw,
}

/// Umbrella error for a derivation run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Whether this is a missing-columns shape error
    #[must_use]
    pub fn is_missing_columns(&self) -> bool {
        matches!(self, Self::Artifact(e) if e.missing_columns().is_some())
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
