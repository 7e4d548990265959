//! SFCA Artifact Store
//!
//! Persists derived artifacts under stable logical names and reads them
//! back through the same validation used when they were produced.
//!
//! # Backends
//!
//! - [`FsArtifactStore`]: one CSV file per artifact plus a JSON manifest,
//!   published by atomic rename
//! - [`MemoryArtifactStore`]: in-process, for tests and embedded consumers
//!
//! # Read path
//!
//! [`ArtifactReader::load`] returns a typed [`sfca_artifact::Artifact`] or
//! a [`LoadError`] that keeps "not published" apart from "failed validation".
//! [`SessionSnapshot`] loads all four views at once.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod codec;
mod error;
mod fs;
mod manifest;
mod reader;
mod snapshot;
mod store;

pub use codec::{read_csv, to_csv_string, write_csv};
pub use error::{LoadError, StoreError, StoreResult};
pub use fs::FsArtifactStore;
pub use manifest::{Manifest, ManifestEntry, MANIFEST_FILE};
pub use reader::ArtifactReader;
pub use snapshot::{DisplayDefaults, SessionSnapshot};
pub use store::{validate_name, ArtifactStore, MemoryArtifactStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
