//! Per-session view of the published artifact set
//!
//! Each artifact loads independently; a missing or invalid one disables
//! only the views that depend on it.

use crate::error::LoadError;
use crate::reader::ArtifactReader;
use crate::store::ArtifactStore;
use serde::{Deserialize, Serialize};
use sfca_artifact::time::WEEKDAYS;
use sfca_artifact::{
    Artifact, ArtifactKind, CitywideMonthly, Forecast, HourWeekday, NeighborhoodCategoryMonthly,
    Table, Value,
};
use std::collections::BTreeSet;

/// Presentation defaults: how many of the sorted labels start out selected
///
/// These never influence derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayDefaults {
    pub category_count: usize,
    pub neighborhood_count: usize,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            category_count: 10,
            neighborhood_count: 5,
        }
    }
}

/// Immutable snapshot of all four artifacts
#[derive(Debug)]
pub struct SessionSnapshot {
    pub citywide: Result<Artifact<CitywideMonthly>, LoadError>,
    pub neighborhood_category: Result<Artifact<NeighborhoodCategoryMonthly>, LoadError>,
    pub hourly: Result<Artifact<HourWeekday>, LoadError>,
    pub forecast: Result<Artifact<Forecast>, LoadError>,
    defaults: DisplayDefaults,
}

fn degraded<K: ArtifactKind>(result: &Result<Artifact<K>, LoadError>) {
    match result {
        Ok(_) => {}
        Err(LoadError::NotFound(_)) => {
            tracing::warn!(artifact = K::NAME, "artifact not published; view disabled");
        }
        Err(e) => tracing::warn!(artifact = K::NAME, error = %e, "artifact invalid; view disabled"),
    }
}

impl SessionSnapshot {
    /// Load every artifact through `reader`
    pub fn load<S: ArtifactStore>(reader: &ArtifactReader<S>, defaults: DisplayDefaults) -> Self {
        let citywide = reader.load::<CitywideMonthly>();
        let neighborhood_category = reader.load::<NeighborhoodCategoryMonthly>();
        let hourly = reader.load::<HourWeekday>();
        let forecast = reader.load::<Forecast>();
        degraded(&citywide);
        degraded(&neighborhood_category);
        degraded(&hourly);
        degraded(&forecast);
        Self {
            citywide,
            neighborhood_category,
            hourly,
            forecast,
            defaults,
        }
    }

    /// Names of the artifacts that loaded, in publish order
    #[must_use]
    pub fn available_views(&self) -> Vec<&'static str> {
        let mut views = Vec::new();
        if self.citywide.is_ok() {
            views.push(CitywideMonthly::NAME);
        }
        if self.neighborhood_category.is_ok() {
            views.push(NeighborhoodCategoryMonthly::NAME);
        }
        if self.hourly.is_ok() {
            views.push(HourWeekday::NAME);
        }
        if self.forecast.is_ok() {
            views.push(Forecast::NAME);
        }
        views
    }

    #[inline]
    #[must_use]
    pub fn defaults(&self) -> DisplayDefaults {
        self.defaults
    }

    /// Sorted neighborhoods of the neighborhood×category view
    #[must_use]
    pub fn neighborhoods(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        if let Ok(a) = &self.neighborhood_category {
            collect_labels(a.table(), "neighborhood", &mut set);
        }
        set.into_iter().collect()
    }

    /// Sorted categories across the neighborhood×category and hourly views
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        if let Ok(a) = &self.neighborhood_category {
            collect_labels(a.table(), "incident_category", &mut set);
        }
        if let Ok(a) = &self.hourly {
            collect_labels(a.table(), "incident_category", &mut set);
        }
        set.into_iter().collect()
    }

    /// First `neighborhood_count` neighborhoods
    #[must_use]
    pub fn default_neighborhoods(&self) -> Vec<String> {
        let mut all = self.neighborhoods();
        all.truncate(self.defaults.neighborhood_count);
        all
    }

    /// First `category_count` categories
    #[must_use]
    pub fn default_categories(&self) -> Vec<String> {
        let mut all = self.categories();
        all.truncate(self.defaults.category_count);
        all
    }

    /// Weekday labels present in the hourly view, Monday first
    #[must_use]
    pub fn weekday_options(&self) -> Vec<String> {
        let mut present = BTreeSet::new();
        if let Ok(a) = &self.hourly {
            collect_labels(a.table(), "weekday_label", &mut present);
        }
        let mut options: Vec<String> = WEEKDAYS
            .iter()
            .filter(|d| present.contains(**d))
            .map(|d| (*d).to_string())
            .collect();
        options.extend(
            present
                .into_iter()
                .filter(|d| !WEEKDAYS.contains(&d.as_str())),
        );
        options
    }
}

fn collect_labels(table: &Table, column: &str, into: &mut BTreeSet<String>) {
    if let Some(cells) = table.column(column) {
        into.extend(cells.filter_map(Value::as_text).map(str::to_string));
    }
}
