//! Artifact kind trait and the typed artifact wrapper
//!
//! Defines the [`ArtifactKind`] trait describing each derived view
//! table-driven: its logical name, required columns, coercion rules and
//! content invariants. This is a sealed trait - the set of views is fixed.

use crate::error::ArtifactError;
use crate::hash::ContentHash;
use crate::normalize::{DropAudit, Normalizer};
use crate::schema::{ColumnRule, SchemaValidator};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::marker::PhantomData;

/// Trait for artifact kinds
///
/// # Contract
/// - `NAME` is the logical store name; stable, lowercase with underscores
/// - every column in `COLUMN_RULES` and `KEY_COLUMNS` is also in `REQUIRED_COLUMNS`
/// - `validate_content` assumes a normalized (typed) table and rejects text cells
pub trait ArtifactKind: Send + Sync + 'static + Debug + private::Sealed {
    /// Logical artifact name
    const NAME: &'static str;

    /// Columns that must be present, both when producing and when loading
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Coercion applied on the load path
    const COLUMN_RULES: &'static [ColumnRule];

    /// Rows without a value in any of these are dropped on load
    const KEY_COLUMNS: &'static [&'static str];

    /// Sort applied on load; empty keeps stored order so ordering violations surface
    const LOAD_ORDER: &'static [&'static str] = &[];

    /// Recompute columns derived from other columns, on the load path
    ///
    /// Runs after coercion and before content validation, so a malformed
    /// stored value in a derived column never rejects the artifact.
    ///
    /// # Errors
    /// Shape errors only
    fn complete(_table: &mut Table) -> Result<(), ArtifactError> {
        Ok(())
    }

    /// Validate content invariants
    ///
    /// Default implementation always succeeds.
    ///
    /// # Errors
    /// Returns [`ArtifactError::InvariantViolation`] if content violates invariants
    fn validate_content(_table: &Table) -> Result<(), ArtifactError> {
        Ok(())
    }
}

/// Sealed trait - prevents external implementations
pub(crate) mod private {
    /// Sealed trait marker
    pub trait Sealed {}
}

/// Schema-validated, invariant-checked table of one kind
///
/// # Invariants
/// - `hash` is always `ContentHash::of_table(&table)`
/// - Immutable after construction
#[derive(Debug)]
pub struct Artifact<K: ArtifactKind> {
    hash: ContentHash,
    table: Table,
    _kind: PhantomData<K>,
}

impl<K: ArtifactKind> Clone for Artifact<K> {
    fn clone(&self) -> Self {
        Self {
            hash: self.hash,
            table: self.table.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: ArtifactKind> PartialEq for Artifact<K> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.table == other.table
    }
}

impl<K: ArtifactKind> Artifact<K> {
    /// Create new artifact (validates schema and content, computes hash)
    ///
    /// # Errors
    /// - [`ArtifactError::MissingColumns`] if a required column is absent
    /// - [`ArtifactError::InvariantViolation`] if content validation fails
    pub fn new(table: Table) -> Result<Self, ArtifactError> {
        SchemaValidator::new().validate(&table, K::NAME, K::REQUIRED_COLUMNS)?;
        K::validate_content(&table)?;
        let hash = ContentHash::of_table(&table);
        Ok(Self {
            hash,
            table,
            _kind: PhantomData,
        })
    }

    /// Load-path construction from a stored (text) table
    ///
    /// Validates the schema, coerces with `K::COLUMN_RULES`, drops rows
    /// missing a key, recomputes derived columns, applies `K::LOAD_ORDER`,
    /// then checks content.
    ///
    /// # Errors
    /// Shape errors only; bad rows are reported through the [`DropAudit`]
    pub fn from_stored(table: &Table) -> Result<(Self, DropAudit), ArtifactError> {
        SchemaValidator::new().validate(table, K::NAME, K::REQUIRED_COLUMNS)?;
        let normalized =
            Normalizer::new(K::NAME, K::COLUMN_RULES, K::KEY_COLUMNS).normalize(table)?;
        let mut table = normalized.table;
        K::complete(&mut table)?;
        if !K::LOAD_ORDER.is_empty() {
            table.sort_by_columns(K::LOAD_ORDER);
        }
        Ok((Self::new(table)?, normalized.audit))
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    #[inline]
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Logical name of this artifact kind
    #[inline]
    #[must_use]
    pub fn name() -> &'static str {
        K::NAME
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Reference to a published artifact of unknown kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynArtifactRef {
    pub name: String,
    pub hash: ContentHash,
    pub rows: usize,
}

impl DynArtifactRef {
    /// Create from typed artifact
    #[inline]
    #[must_use]
    pub fn from_typed<K: ArtifactKind>(artifact: &Artifact<K>) -> Self {
        Self {
            name: K::NAME.to_string(),
            hash: *artifact.hash(),
            rows: artifact.len(),
        }
    }

    /// Create from an untyped table
    #[must_use]
    pub fn from_table(name: impl Into<String>, table: &Table) -> Self {
        Self {
            name: name.into(),
            hash: ContentHash::of_table(table),
            rows: table.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnKind;
    use crate::table::Value;

    #[derive(Debug)]
    struct Tally;

    impl private::Sealed for Tally {}

    impl ArtifactKind for Tally {
        const NAME: &'static str = "tally";
        const REQUIRED_COLUMNS: &'static [&'static str] = &["label", "incidents"];
        const COLUMN_RULES: &'static [ColumnRule] = &[
            ColumnRule::new("label", ColumnKind::Label),
            ColumnRule::new("incidents", ColumnKind::Count),
        ];
        const KEY_COLUMNS: &'static [&'static str] = &["label"];
        const LOAD_ORDER: &'static [&'static str] = &["label"];

        fn validate_content(table: &Table) -> Result<(), ArtifactError> {
            if table.column("incidents").into_iter().flatten().any(|v| v.as_int().is_none()) {
                return Err(ArtifactError::invariant(Self::NAME, "incidents must be integers"));
            }
            Ok(())
        }
    }

    fn stored(rows: &[[&str; 2]]) -> Table {
        Table::from_rows(
            ["label", "incidents"],
            rows.iter()
                .map(|r| r.iter().map(|f| Value::from_raw(f)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_missing_columns() {
        let table = Table::new(["label"]).unwrap();
        let err = Artifact::<Tally>::new(table).unwrap_err();
        assert_eq!(err.missing_columns(), Some(&["incidents".to_string()][..]));
    }

    #[test]
    fn new_runs_content_validation() {
        let err = Artifact::<Tally>::new(stored(&[["a", "3"]])).unwrap_err();
        assert!(matches!(err, ArtifactError::InvariantViolation { .. }));
    }

    #[test]
    fn from_stored_normalizes_sorts_and_audits() {
        let (artifact, audit) =
            Artifact::<Tally>::from_stored(&stored(&[["b", "2"], ["", "9"], ["a", "x"]])).unwrap();
        assert_eq!(audit.dropped(), 1);
        assert_eq!(artifact.table().cell(0, "label"), Some(&Value::text("a")));
        assert_eq!(artifact.table().cell(0, "incidents"), Some(&Value::Int(0)));
        assert_eq!(*artifact.hash(), ContentHash::of_table(artifact.table()));
    }

    #[test]
    fn dyn_ref_matches_typed() {
        let (artifact, _) = Artifact::<Tally>::from_stored(&stored(&[["a", "1"]])).unwrap();
        let dyn_ref = DynArtifactRef::from_typed(&artifact);
        assert_eq!(dyn_ref.name, "tally");
        assert_eq!(dyn_ref.rows, 1);
        assert_eq!(dyn_ref, DynArtifactRef::from_table("tally", artifact.table()));
        assert_eq!(Artifact::<Tally>::name(), "tally");
    }
}
