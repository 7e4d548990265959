//! Error types for the artifact store
//!
//! - [`StoreError`]: persistence failures (write and read)
//! - [`LoadError`]: the consumer-facing read path, where an absent artifact
//!   stays distinguishable from one that failed validation

use sfca_artifact::{ArtifactError, ContentHash};
use std::path::PathBuf;

/// Errors during artifact persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No artifact published under this name
    #[error("artifact not found: '{0}'")]
    NotFound(String),

    /// Name would not map to a single file inside the store
    #[error("invalid artifact name: '{0}' (expected [a-z0-9_]+)")]
    InvalidName(String),

    /// IO error on a store path
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Manifest could not be read or written
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// File content no longer matches the hash recorded at publish time
    #[error("artifact '{name}' is corrupted: published {expected}, found {actual}")]
    Corrupted {
        name: String,
        expected: ContentHash,
        actual: ContentHash,
    },

    /// Stored table is malformed
    #[error("malformed table: {0}")]
    Table(#[from] ArtifactError),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors on the validated read path
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Artifact was never published; callers hide the dependent view
    #[error("artifact not found: '{0}'")]
    NotFound(String),

    /// Artifact exists but fails its schema or invariants
    #[error("artifact failed validation: {0}")]
    Artifact(#[from] ArtifactError),

    /// Artifact exists but could not be read
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LoadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => Self::NotFound(name),
            other => Self::Store(other),
        }
    }
}

impl LoadError {
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_stays_not_found_on_read_path() {
        let err: LoadError = StoreError::NotFound("forecast_citywide_monthly".to_string()).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "artifact not found: 'forecast_citywide_monthly'");
    }

    #[test]
    fn other_store_errors_are_wrapped() {
        let err: LoadError = StoreError::InvalidName("../x".to_string()).into();
        assert!(matches!(err, LoadError::Store(StoreError::InvalidName(_))));
    }
}
