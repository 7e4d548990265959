//! Directory-backed store
//!
//! Layout: one `<name>.csv` per artifact plus `manifest.json`. Every file
//! is written to a temporary file in the same directory and renamed over
//! the final path, so a reader never observes a partial write.

use crate::codec::{read_csv, write_csv};
use crate::error::{StoreError, StoreResult};
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::store::{validate_name, ArtifactStore};
use parking_lot::RwLock;
use sfca_artifact::{ContentHash, DynArtifactRef, Table};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const EXTENSION: &str = "csv";

/// Artifact store rooted at a directory
#[derive(Debug)]
pub struct FsArtifactStore {
    root: PathBuf,
    // writers hold it across file + manifest replacement; readers across both reads
    publish: RwLock<()>,
}

impl FsArtifactStore {
    /// Open (creating if needed) a store at `root`
    ///
    /// # Errors
    /// Directory could not be created
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| StoreError::io_error(&root, e))?;
        Ok(Self {
            root,
            publish: RwLock::new(()),
        })
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `name`
    #[must_use]
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{EXTENSION}"))
    }

    /// Current manifest
    ///
    /// # Errors
    /// Manifest unreadable
    pub fn manifest(&self) -> StoreResult<Manifest> {
        Manifest::load(&self.root)
    }

    fn write_atomic<F>(&self, path: &Path, fill: F) -> StoreResult<()>
    where
        F: FnOnce(&mut NamedTempFile) -> StoreResult<()>,
    {
        let mut tmp =
            NamedTempFile::new_in(&self.root).map_err(|e| StoreError::io_error(&self.root, e))?;
        fill(&mut tmp)?;
        tmp.flush().map_err(|e| StoreError::io_error(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io_error(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| StoreError::io_error(path, e.error))?;
        Ok(())
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, name: &str, table: &Table) -> StoreResult<DynArtifactRef> {
        validate_name(name)?;
        let reference = DynArtifactRef::from_table(name, table);
        let path = self.artifact_path(name);

        let _guard = self.publish.write();
        self.write_atomic(&path, |tmp| write_csv(table, tmp))?;

        let mut manifest = self.manifest()?;
        manifest.record(&reference, table.column_names());
        let json = manifest.to_json()?;
        self.write_atomic(&self.root.join(MANIFEST_FILE), |tmp| {
            tmp.write_all(json.as_bytes())
                .map_err(|e| StoreError::io_error(tmp.path(), e))
        })?;

        tracing::info!(
            artifact = name,
            rows = reference.rows,
            hash = %reference.hash.short(),
            path = %path.display(),
            "published"
        );
        Ok(reference)
    }

    fn get(&self, name: &str) -> StoreResult<Table> {
        validate_name(name)?;
        let path = self.artifact_path(name);
        let _guard = self.publish.read();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        let table = read_csv(file)?;

        if let Some(entry) = self.manifest()?.get(name) {
            let actual = ContentHash::of_table(&table);
            if actual != entry.content_hash {
                return Err(StoreError::Corrupted {
                    name: name.to_string(),
                    expected: entry.content_hash,
                    actual,
                });
            }
        }
        Ok(table)
    }

    fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.artifact_path(name).is_file()
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| StoreError::io_error(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io_error(&self.root, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
