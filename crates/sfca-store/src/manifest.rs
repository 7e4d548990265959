//! Store manifest: what was published, when, and with which content hash

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sfca_artifact::{ContentHash, DynArtifactRef};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the manifest inside a store directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// One published artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub content_hash: ContentHash,
    pub rows: usize,
    pub columns: Vec<String>,
    pub published_at: DateTime<Utc>,
}

/// Name → entry, serialized as JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Read the manifest in `dir`; an absent file is an empty manifest
    ///
    /// # Errors
    /// IO failure other than not-found, or malformed JSON
    pub fn load(dir: &Path) -> StoreResult<Self> {
        let path = dir.join(MANIFEST_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }

    /// Record a publish
    pub fn record(&mut self, reference: &DynArtifactRef, columns: Vec<String>) {
        self.entries.insert(
            reference.name.clone(),
            ManifestEntry {
                content_hash: reference.hash,
                rows: reference.rows,
                columns,
                published_at: Utc::now(),
            },
        );
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON rendering
    ///
    /// # Errors
    /// Serialization failure
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfca_artifact::{Table, Value};

    #[test]
    fn absent_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Manifest::load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn entries_serialize_hash_as_hex() {
        let table = Table::from_rows(["a"], vec![vec![Value::Int(1)]]).unwrap();
        let reference = DynArtifactRef::from_table("t", &table);
        let mut manifest = Manifest::default();
        manifest.record(&reference, table.column_names());

        let json = manifest.to_json().unwrap();
        assert!(json.contains(&reference.hash.to_string()));
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manifest);
        assert_eq!(back.get("t").map(|e| e.rows), Some(1));
    }
}
