//! Validated read path
//!
//! Every consumer load goes through the same sequence as publishing did:
//! schema check, type normalization, content invariants. Loaded artifacts
//! are cached per session and are never mutated.

use crate::error::LoadError;
use crate::store::ArtifactStore;
use moka::sync::Cache;
use sfca_artifact::{Artifact, ArtifactKind};
use std::any::Any;
use std::sync::Arc;

/// Cache capacity; one entry per artifact kind
const CACHE_CAPACITY: u64 = 16;

/// Typed, cached loader over an [`ArtifactStore`]
pub struct ArtifactReader<S> {
    store: S,
    cache: Cache<String, Arc<dyn Any + Send + Sync>>,
}

impl<S: ArtifactStore> ArtifactReader<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: Cache::new(CACHE_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load and validate the artifact of kind `K`
    ///
    /// # Errors
    /// - [`LoadError::NotFound`] if nothing was published under `K::NAME`
    /// - [`LoadError::Artifact`] if the stored table fails its schema or invariants
    /// - [`LoadError::Store`] on a read failure
    pub fn load<K: ArtifactKind>(&self) -> Result<Artifact<K>, LoadError> {
        if let Some(hit) = self.cached::<K>() {
            return Ok(hit);
        }

        let stored = self.store.get(K::NAME)?;
        let (artifact, audit) = Artifact::<K>::from_stored(&stored)?;
        tracing::debug!(
            artifact = K::NAME,
            rows = artifact.len(),
            dropped = audit.dropped(),
            "loaded"
        );
        self.cache
            .insert(K::NAME.to_string(), Arc::new(artifact.clone()));
        Ok(artifact)
    }

    fn cached<K: ArtifactKind>(&self) -> Option<Artifact<K>> {
        self.cache
            .get(K::NAME)
            .and_then(|entry| entry.downcast_ref::<Artifact<K>>().cloned())
    }

    /// Drop every cached artifact; the next load re-reads the store
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl<S> std::fmt::Debug for ArtifactReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactReader")
            .field("cached", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
