//! Cross-artifact consistency
//!
//! The views are derived independently and can drift if their filters or
//! time axes differ. These checks are exact: counts are integers.

use crate::error::ConsistencyError;
use chrono::NaiveDate;
use sfca_artifact::time::next_month;
use sfca_artifact::{
    Artifact, ArtifactKind, CitywideMonthly, DynArtifactRef, Forecast, HourWeekday,
    NeighborhoodCategoryMonthly, Table, INCIDENTS,
};
use sfca_store::SessionSnapshot;
use std::collections::{BTreeMap, BTreeSet};

/// A complete (or partial) set of validated artifacts
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    pub citywide: Option<Artifact<CitywideMonthly>>,
    pub neighborhood_category: Option<Artifact<NeighborhoodCategoryMonthly>>,
    pub hourly: Option<Artifact<HourWeekday>>,
    pub forecast: Option<Artifact<Forecast>>,
}

impl ArtifactSet {
    /// Every artifact that loaded in `snapshot`
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            citywide: snapshot.citywide.as_ref().ok().cloned(),
            neighborhood_category: snapshot.neighborhood_category.as_ref().ok().cloned(),
            hourly: snapshot.hourly.as_ref().ok().cloned(),
            forecast: snapshot.forecast.as_ref().ok().cloned(),
        }
    }

    /// Name and table of every present artifact, in publish order
    #[must_use]
    pub fn tables(&self) -> Vec<(&'static str, &Table)> {
        let mut out = Vec::new();
        if let Some(a) = &self.citywide {
            out.push((CitywideMonthly::NAME, a.table()));
        }
        if let Some(a) = &self.neighborhood_category {
            out.push((NeighborhoodCategoryMonthly::NAME, a.table()));
        }
        if let Some(a) = &self.hourly {
            out.push((HourWeekday::NAME, a.table()));
        }
        if let Some(a) = &self.forecast {
            out.push((Forecast::NAME, a.table()));
        }
        out
    }

    #[must_use]
    pub fn refs(&self) -> Vec<DynArtifactRef> {
        self.tables()
            .into_iter()
            .map(|(name, table)| DynArtifactRef::from_table(name, table))
            .collect()
    }
}

/// Monthly totals from an aggregate keyed by `month`
fn monthly_totals(
    table: &Table,
    artifact: &'static str,
) -> Result<BTreeMap<NaiveDate, i64>, ConsistencyError> {
    let mut totals = BTreeMap::new();
    let (Some(months), Some(counts)) = (table.column("month"), table.column(INCIDENTS)) else {
        return Ok(totals);
    };
    for (month, count) in months.zip(counts) {
        if let Some(month) = month.as_date() {
            let total: &mut i64 = totals.entry(month).or_default();
            *total = total
                .checked_add(count.as_int().unwrap_or(0))
                .ok_or(ConsistencyError::CountOverflow { artifact, month })?;
        }
    }
    Ok(totals)
}

/// Citywide series re-derived by summing over neighborhood and category
///
/// # Errors
/// [`ConsistencyError::CountOverflow`] if a month's total overflows
pub fn rederive_citywide(
    neighborhood_category: &Table,
) -> Result<BTreeMap<NaiveDate, i64>, ConsistencyError> {
    monthly_totals(neighborhood_category, NeighborhoodCategoryMonthly::NAME)
}

/// Runs the cross-artifact invariants
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyChecker;

impl ConsistencyChecker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check every invariant whose artifacts are present
    ///
    /// # Errors
    /// The first violated invariant
    pub fn check(&self, set: &ArtifactSet) -> Result<(), ConsistencyError> {
        if let (Some(citywide), Some(nbh)) = (&set.citywide, &set.neighborhood_category) {
            check_monthly(citywide.table(), nbh.table())?;
        }
        if let (Some(citywide), Some(forecast)) = (&set.citywide, &set.forecast) {
            check_forecast(citywide.table(), forecast.table())?;
        }
        tracing::debug!(artifacts = set.tables().len(), "consistency checks passed");
        Ok(())
    }
}

fn check_monthly(citywide: &Table, nbh: &Table) -> Result<(), ConsistencyError> {
    let stored = monthly_totals(citywide, CitywideMonthly::NAME)?;
    let rederived = rederive_citywide(nbh)?;
    let months: BTreeSet<NaiveDate> = stored.keys().chain(rederived.keys()).copied().collect();
    for month in months {
        let expected = rederived.get(&month).copied().unwrap_or(0);
        let actual = stored.get(&month).copied().unwrap_or(0);
        if expected != actual {
            return Err(ConsistencyError::InconsistentAggregates {
                month,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

fn check_forecast(citywide: &Table, forecast: &Table) -> Result<(), ConsistencyError> {
    let last_historical = citywide
        .column("month")
        .and_then(|cells| cells.filter_map(|v| v.as_date()).max());
    let first_forecast = forecast
        .column("month")
        .and_then(|cells| cells.filter_map(|v| v.as_date()).min());
    if let (Some(last_historical), Some(first_forecast)) = (last_historical, first_forecast) {
        if next_month(last_historical) != Some(first_forecast) {
            return Err(ConsistencyError::ForecastMisaligned {
                last_historical,
                first_forecast,
            });
        }
    }
    Ok(())
}
