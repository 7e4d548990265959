//! Hour×Weekday: `(weekday_label, hour, incident_category) → incidents`

use super::{ints, labels, INCIDENTS};
use crate::artifact::{private, ArtifactKind};
use crate::error::ArtifactError;
use crate::schema::{ColumnKind, ColumnRule};
use crate::table::Table;
use crate::time::is_canonical_weekday;

/// Incident totals by weekday, hour of day and category
///
/// # Invariants
/// - `weekday_label` is one of the seven canonical weekday names
/// - `hour` is within `[0,23]`
#[derive(Debug, Clone, Copy)]
pub struct HourWeekday;

impl private::Sealed for HourWeekday {}

impl ArtifactKind for HourWeekday {
    const NAME: &'static str = "hourly_weekday_counts";
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["weekday_label", "hour", "incident_category", INCIDENTS];
    const COLUMN_RULES: &'static [ColumnRule] = &[
        ColumnRule::new("weekday_label", ColumnKind::Weekday),
        ColumnRule::new("hour", ColumnKind::Hour),
        ColumnRule::new("incident_category", ColumnKind::Label),
        ColumnRule::new(INCIDENTS, ColumnKind::Count),
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["weekday_label", "hour", "incident_category"];

    fn validate_content(table: &Table) -> Result<(), ArtifactError> {
        let weekdays = labels(table, Self::NAME, "weekday_label")?;
        if let Some(bad) = weekdays.iter().find(|w| !is_canonical_weekday(w)) {
            return Err(ArtifactError::invariant(
                Self::NAME,
                format!("'{bad}' is not a canonical weekday label"),
            ));
        }
        let hours = ints(table, Self::NAME, "hour")?;
        if let Some(bad) = hours.iter().find(|h| !(0..=23).contains(*h)) {
            return Err(ArtifactError::invariant(
                Self::NAME,
                format!("hour {bad} outside 0-23"),
            ));
        }
        labels(table, Self::NAME, "incident_category")?;
        ints(table, Self::NAME, INCIDENTS)?;
        Ok(())
    }
}
