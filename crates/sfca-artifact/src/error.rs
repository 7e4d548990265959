//! Error types for tables and artifacts
//!
//! Shape errors only. Per-row coercion failures are never raised; the
//! normalizer absorbs them and reports them through its drop audit.

/// Errors related to table shape and artifact invariants
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Required columns absent (sorted, deterministic)
    #[error("{artifact} is missing required columns: {missing:?}")]
    MissingColumns {
        artifact: String,
        missing: Vec<String>,
    },

    /// Content invariant violation
    #[error("{artifact} violates an invariant: {reason}")]
    InvariantViolation { artifact: String, reason: String },

    /// A count total does not fit in an `i64`
    #[error("{artifact}: '{column}' total overflows")]
    CountOverflow { artifact: String, column: String },

    /// Row width differs from the column count
    #[error("ragged row: expected {expected} cells, got {actual}")]
    RaggedRow { expected: usize, actual: usize },

    /// Column name used twice
    #[error("duplicate column: '{0}'")]
    DuplicateColumn(String),
}

impl ArtifactError {
    /// Create invariant violation for artifact
    pub fn invariant(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// Create count overflow for `column` of artifact
    pub fn overflow(artifact: impl Into<String>, column: impl Into<String>) -> Self {
        Self::CountOverflow {
            artifact: artifact.into(),
            column: column.into(),
        }
    }

    /// Missing column names, if this is a [`ArtifactError::MissingColumns`]
    #[must_use]
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            Self::MissingColumns { missing, .. } => Some(missing),
            _ => None,
        }
    }
}
