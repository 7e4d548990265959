//! Schema validation and per-column coercion rules
//!
//! The same validator guards both directions: freshly aggregated tables
//! before they are published, and stored tables before a consumer sees them.

use crate::error::ArtifactError;
use crate::table::Table;
use std::collections::BTreeSet;

/// Required-column validation
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Required columns absent from `table`, sorted and deduplicated
    #[must_use]
    pub fn missing(table: &Table, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !table.has_column(c))
            .map(|c| (*c).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Confirm every required column is present
    ///
    /// # Returns
    /// - `Ok(table)` unchanged
    /// - `Err(ArtifactError::MissingColumns)` naming exactly the missing columns, sorted
    pub fn validate<'t>(
        &self,
        table: &'t Table,
        artifact: &str,
        required: &[&str],
    ) -> Result<&'t Table, ArtifactError> {
        let missing = Self::missing(table, required);
        if missing.is_empty() {
            Ok(table)
        } else {
            Err(ArtifactError::MissingColumns {
                artifact: artifact.to_string(),
                missing,
            })
        }
    }
}

/// Shorthand for [`SchemaValidator::validate`]
///
/// # Errors
/// Returns [`ArtifactError::MissingColumns`] if any required column is absent
pub fn validate_columns<'t>(
    table: &'t Table,
    artifact: &str,
    required: &[&str],
) -> Result<&'t Table, ArtifactError> {
    SchemaValidator::new().validate(table, artifact, required)
}

/// Canonical type a column is coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// First-of-month date key; unparsable → missing
    Month,
    /// Integer count; unparsable → 0
    Count,
    /// Hour of day in `[0,23]`; unparsable or out of range → row dropped
    Hour,
    /// Floating point measure; unparsable → missing
    Measure,
    /// Trimmed text label; empty → missing
    Label,
    /// Canonical weekday label; unknown → missing
    Weekday,
}

/// Coercion rule for one named column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    pub column: &'static str,
    pub kind: ColumnKind,
}

impl ColumnRule {
    #[inline]
    #[must_use]
    pub const fn new(column: &'static str, kind: ColumnKind) -> Self {
        Self { column, kind }
    }
}
