//! Artifact store trait and the in-memory backend

use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use sfca_artifact::{DynArtifactRef, Table};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Keyed store of published artifact tables
///
/// # Contract
/// - `put` replaces the whole artifact; readers see the old or the new
///   table, never a mix
/// - `get` on a name that was never published returns [`StoreError::NotFound`]
pub trait ArtifactStore: Send + Sync {
    /// Publish `table` under `name`
    ///
    /// # Errors
    /// Invalid name or a persistence failure
    fn put(&self, name: &str, table: &Table) -> StoreResult<DynArtifactRef>;

    /// Read the table published under `name`
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when absent, otherwise a read failure
    fn get(&self, name: &str) -> StoreResult<Table>;

    /// Whether an artifact is published under `name`
    fn exists(&self, name: &str) -> bool;

    /// Published names, sorted
    ///
    /// # Errors
    /// Listing failure
    fn names(&self) -> StoreResult<Vec<String>>;
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for &S {
    fn put(&self, name: &str, table: &Table) -> StoreResult<DynArtifactRef> {
        (**self).put(name, table)
    }

    fn get(&self, name: &str) -> StoreResult<Table> {
        (**self).get(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        (**self).names()
    }
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for Arc<S> {
    fn put(&self, name: &str, table: &Table) -> StoreResult<DynArtifactRef> {
        (**self).put(name, table)
    }

    fn get(&self, name: &str) -> StoreResult<Table> {
        (**self).get(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        (**self).names()
    }
}

/// Check that `name` is non-empty `[a-z0-9_]+`
///
/// # Errors
/// [`StoreError::InvalidName`] otherwise
pub fn validate_name(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// In-process store, one table per name
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    tables: RwLock<BTreeMap<String, Table>>,
}

impl MemoryArtifactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put(&self, name: &str, table: &Table) -> StoreResult<DynArtifactRef> {
        validate_name(name)?;
        let reference = DynArtifactRef::from_table(name, table);
        self.tables.write().insert(name.to_string(), table.clone());
        tracing::debug!(artifact = name, rows = reference.rows, "stored in memory");
        Ok(reference)
    }

    fn get(&self, name: &str) -> StoreResult<Table> {
        validate_name(name)?;
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        Ok(self.tables.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfca_artifact::Value;

    #[test]
    fn names_are_restricted() {
        assert!(validate_name("monthly_citywide").is_ok());
        assert!(validate_name("view2").is_ok());
        for bad in ["", "../etc", "Monthly", "a-b", "a.csv", "a b"] {
            assert!(
                matches!(validate_name(bad), Err(StoreError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn memory_store_replaces_whole_entry() {
        let store = MemoryArtifactStore::new();
        let first = Table::from_rows(["a"], vec![vec![Value::Int(1)], vec![Value::Int(2)]]).unwrap();
        let second = Table::from_rows(["a"], vec![vec![Value::Int(3)]]).unwrap();
        store.put("t", &first).unwrap();
        let reference = store.put("t", &second).unwrap();
        assert_eq!(reference.rows, 1);
        assert_eq!(store.get("t").unwrap(), second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_store_not_found() {
        let store = MemoryArtifactStore::new();
        assert!(store.get("absent").unwrap_err().is_not_found());
        assert!(!store.exists("absent"));
    }

    #[test]
    fn shared_handles_see_the_same_store() {
        let store = Arc::new(MemoryArtifactStore::new());
        let table = Table::new(["a"]).unwrap();
        (&store).put("x", &table).unwrap();
        assert_eq!(store.names().unwrap(), vec!["x".to_string()]);
    }
}
