//! Pipeline configuration
//!
//! Loaded from TOML; every section and field is optional.
//!
//! ```toml
//! [paths]
//! raw = "data/processed/incidents_clean.csv"
//! forecast = "data/processed/forecast_citywide_monthly.csv"
//! artifacts_dir = "data/processed"
//!
//! [derive]
//! views = ["monthly_citywide", "monthly_neighborhood_category", "hourly_weekday_counts"]
//!
//! [display]
//! category_count = 10
//! neighborhood_count = 5
//! ```

use crate::error::ConfigError;
use crate::view::View;
use serde::{Deserialize, Serialize};
use sfca_store::DisplayDefaults;
use std::path::{Path, PathBuf};

/// Default artifact directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "data/processed";

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub raw: Option<PathBuf>,
    pub forecast: Option<PathBuf>,
    pub artifacts_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw: None,
            forecast: None,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
        }
    }
}

/// Which views a derivation run produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveConfig {
    pub views: Vec<View>,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            views: View::ALL.to_vec(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub derive: DeriveConfig,
    pub display: DisplayDefaults,
}

impl PipelineConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Malformed TOML or an unknown view name
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Unreadable file, malformed TOML or an unknown view name
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), views = config.derive.views.len(), "loaded config");
        Ok(config)
    }

    #[inline]
    #[must_use]
    pub fn with_raw(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.raw = Some(path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_forecast(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.forecast = Some(path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.artifacts_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_views(mut self, views: impl IntoIterator<Item = View>) -> Self {
        self.derive.views = views.into_iter().collect();
        self
    }

    /// Configured views, deduplicated, in canonical order
    #[must_use]
    pub fn views(&self) -> Vec<View> {
        let mut views = self.derive.views.clone();
        views.sort();
        views.dedup();
        views
    }
}
