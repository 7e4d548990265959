//! Batch derivation
//!
//! One run: validate raw schema, resolve the time axis, normalize each input
//! frame once, aggregate every configured view, validate the forecast, check
//! consistency, then publish. Nothing is published unless every step passed.

use crate::aggregate::{citywide_monthly, hourly_weekday, neighborhood_category_monthly};
use crate::config::PipelineConfig;
use crate::consistency::{ArtifactSet, ConsistencyChecker};
use crate::error::{ConfigError, PipelineResult};
use crate::time_axis::{resolve_time_axis, TimeSource, MONTH};
use crate::view::{View, HOURLY_RAW_COLUMNS};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use sfca_artifact::{
    Artifact, ColumnKind, ColumnRule, DropAudit, DynArtifactRef, Forecast, Normalizer,
    SchemaValidator, Table,
};
use sfca_store::{read_csv, ArtifactStore, FsArtifactStore, StoreError};
use std::fs::File;
use std::path::Path;

/// Label used for the raw input in errors and logs
pub const RAW_INPUT: &str = "raw incidents";

const MONTHLY_RULES: &[ColumnRule] = &[
    ColumnRule::new(MONTH, ColumnKind::Month),
    ColumnRule::new("neighborhood", ColumnKind::Label),
    ColumnRule::new("incident_category", ColumnKind::Label),
];
const MONTHLY_KEYS: &[&str] = &[MONTH, "neighborhood", "incident_category"];

const HOURLY_RULES: &[ColumnRule] = &[
    ColumnRule::new("weekday_label", ColumnKind::Weekday),
    ColumnRule::new("hour", ColumnKind::Hour),
    ColumnRule::new("incident_category", ColumnKind::Label),
];

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationReport {
    /// Time source of the monthly frame, if a monthly view ran
    pub time_source: Option<TimeSource>,
    pub monthly_audit: Option<DropAudit>,
    pub hourly_audit: Option<DropAudit>,
    pub forecast_audit: Option<DropAudit>,
    /// Published artifacts, in publish order
    pub published: Vec<DynArtifactRef>,
}

impl DerivationReport {
    /// Row count of a published artifact
    #[must_use]
    pub fn rows(&self, name: &str) -> Option<usize> {
        self.published.iter().find(|r| r.name == name).map(|r| r.rows)
    }

    /// Raw rows dropped across both frames
    #[must_use]
    pub fn rows_dropped(&self) -> usize {
        [&self.monthly_audit, &self.hourly_audit]
            .into_iter()
            .flatten()
            .map(DropAudit::dropped)
            .sum()
    }
}

/// A configured derivation
#[derive(Debug, Clone)]
pub struct DerivationRun {
    config: PipelineConfig,
}

impl DerivationRun {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Derive every configured view from `raw` and publish to `store`
    ///
    /// # Errors
    /// Any shape, invariant or consistency error; the store is untouched then
    pub fn run<S: ArtifactStore>(
        &self,
        raw: &Table,
        forecast: Option<&Table>,
        store: &S,
    ) -> PipelineResult<DerivationReport> {
        let views = self.config.views();
        let monthly = views.iter().any(|v| v.is_monthly());
        let hourly = views.contains(&View::HourWeekday);

        let required: IndexSet<&str> = views.iter().flat_map(|v| v.raw_columns()).copied().collect();
        let required: Vec<&str> = required.into_iter().collect();
        SchemaValidator::new().validate(raw, RAW_INPUT, &required)?;
        tracing::info!(rows = raw.len(), views = views.len(), "derivation started");

        let mut report = DerivationReport::default();
        let mut set = ArtifactSet::default();

        if monthly {
            let resolved = resolve_time_axis(raw)?;
            report.time_source = Some(resolved.source);
            let normalized =
                Normalizer::new(RAW_INPUT, MONTHLY_RULES, MONTHLY_KEYS).normalize(&resolved.table)?;
            if views.contains(&View::CitywideMonthly) {
                set.citywide = Some(citywide_monthly(&normalized.table)?);
            }
            if views.contains(&View::NeighborhoodCategoryMonthly) {
                set.neighborhood_category =
                    Some(neighborhood_category_monthly(&normalized.table)?);
            }
            report.monthly_audit = Some(normalized.audit);
        }

        if hourly {
            let normalized =
                Normalizer::new(RAW_INPUT, HOURLY_RULES, HOURLY_RAW_COLUMNS).normalize(raw)?;
            set.hourly = Some(hourly_weekday(&normalized.table)?);
            report.hourly_audit = Some(normalized.audit);
        }

        if let Some(forecast) = forecast {
            let (artifact, audit) = Artifact::<Forecast>::from_stored(forecast)?;
            set.forecast = Some(artifact);
            report.forecast_audit = Some(audit);
        }

        ConsistencyChecker::new().check(&set)?;

        for (name, table) in set.tables() {
            report.published.push(store.put(name, table)?);
        }
        tracing::info!(
            published = report.published.len(),
            dropped = report.rows_dropped(),
            "derivation finished"
        );
        Ok(report)
    }
}

fn read_table(path: &Path) -> PipelineResult<Table> {
    let file = File::open(path).map_err(|e| StoreError::io_error(path, e))?;
    let table = read_csv(file)?;
    tracing::debug!(path = %path.display(), rows = table.len(), "read input");
    Ok(table)
}

/// Run a derivation over the files named by `config`
///
/// # Errors
/// [`ConfigError::MissingRaw`] without a raw path, otherwise as [`DerivationRun::run`]
pub fn derive_from_paths(config: &PipelineConfig) -> PipelineResult<DerivationReport> {
    let raw_path = config.paths.raw.as_deref().ok_or(ConfigError::MissingRaw)?;
    let raw = read_table(raw_path)?;
    let forecast = config
        .paths
        .forecast
        .as_deref()
        .map(read_table)
        .transpose()?;
    let store = FsArtifactStore::open(&config.paths.artifacts_dir)?;
    DerivationRun::new(config.clone()).run(&raw, forecast.as_ref(), &store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConsistencyError, PipelineError};
    use sfca_store::MemoryArtifactStore;
    use sfca_test_utils::{forecast_table, mission_january, raw_table, RawIncident};

    #[test]
    fn publishes_all_views() {
        let store = MemoryArtifactStore::new();
        let report = DerivationRun::new(PipelineConfig::default())
            .run(&mission_january(), None, &store)
            .unwrap();
        assert_eq!(report.time_source, Some(TimeSource::Month));
        assert_eq!(report.rows("monthly_citywide"), Some(1));
        assert_eq!(report.rows("monthly_neighborhood_category"), Some(2));
        assert_eq!(report.rows("hourly_weekday_counts"), Some(2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn only_configured_views_are_published() {
        let store = MemoryArtifactStore::new();
        let config = PipelineConfig::default().with_views([View::HourWeekday]);
        let raw = raw_table("unused", &RawIncident::at("x").times(2));
        let report = DerivationRun::new(config).run(&raw, None, &store).unwrap();
        assert_eq!(report.time_source, None);
        assert_eq!(store.names().unwrap(), vec!["hourly_weekday_counts".to_string()]);
    }

    #[test]
    fn misaligned_forecast_blocks_publishing() {
        let store = MemoryArtifactStore::new();
        let forecast = forecast_table(&[("2024-03", 5.0, 4.0, 6.0)]);
        let err = DerivationRun::new(PipelineConfig::default())
            .run(&mission_january(), Some(&forecast), &store)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Consistency(ConsistencyError::ForecastMisaligned { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn missing_raw_column_is_shape_error() {
        let raw = sfca_test_utils::text_table(&["month", "neighborhood"], &[&["2024-01", "Mission"]]);
        let err = DerivationRun::new(PipelineConfig::default())
            .run(&raw, None, &MemoryArtifactStore::new())
            .unwrap_err();
        assert!(err.is_missing_columns());
        assert!(err.to_string().contains("raw incidents"));
    }

    #[test]
    fn missing_raw_path_is_config_error() {
        let err = derive_from_paths(&PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Config(ConfigError::MissingRaw)));
    }
}
