//! Time-axis resolution
//!
//! Produces the canonical `month` column (first-of-month date) from the
//! first time source present in the input schema:
//!
//! 1. `year_month`: pre-computed monthly key
//! 2. `month`: generic month column
//! 3. `incident_datetime`: event timestamp, truncated to its month
//!
//! Presence is decided by the schema alone. A present source whose cells do
//! not parse still wins; those rows get a missing month and are dropped by
//! the normalizer.

use crate::error::NormalizeError;
use serde::{Deserialize, Serialize};
use sfca_artifact::time::{month_start, parse_month, parse_timestamp};
use sfca_artifact::{Table, Value};
use std::fmt;

/// Name of the canonical month column
pub const MONTH: &str = "month";

/// Which raw column the time axis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    YearMonth,
    Month,
    EventTimestamp,
}

impl TimeSource {
    /// Resolution order, first present wins
    pub const PREFERENCE: [Self; 3] = [Self::YearMonth, Self::Month, Self::EventTimestamp];

    /// Raw column backing this source
    #[inline]
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::YearMonth => "year_month",
            Self::Month => MONTH,
            Self::EventTimestamp => "incident_datetime",
        }
    }

    fn month_of(self, cell: &Value) -> Value {
        let month = match (self, cell) {
            (_, Value::Date(d)) => Some(month_start(*d)),
            (_, Value::Timestamp(t)) => Some(month_start(t.date())),
            (Self::EventTimestamp, Value::Text(s)) => parse_timestamp(s).map(|t| month_start(t.date())),
            (_, Value::Text(s)) => parse_month(s),
            _ => None,
        };
        month.map_or(Value::Missing, Value::Date)
    }
}

impl fmt::Display for TimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Table with a canonical `month` column, plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub table: Table,
    pub source: TimeSource,
}

/// Resolve the canonical month for every row of `table`
///
/// Source columns are left in place; a `month` source is overwritten in
/// place with its canonical form.
///
/// # Errors
/// [`NormalizeError::NoTimeSource`] if no time source column exists
pub fn resolve_time_axis(table: &Table) -> Result<Resolved, NormalizeError> {
    let Some(source) = TimeSource::PREFERENCE
        .into_iter()
        .find(|s| table.has_column(s.column()))
    else {
        let mut available = table.column_names();
        available.sort();
        return Err(NormalizeError::NoTimeSource { available });
    };

    let months: Vec<Value> = table
        .column(source.column())
        .map(|cells| cells.map(|cell| source.month_of(cell)).collect())
        .unwrap_or_default();
    let unparsed = months.iter().filter(|m| m.is_missing()).count();

    let mut resolved = table.clone();
    resolved.set_column(MONTH, months)?;
    tracing::debug!(source = %source, rows = table.len(), unparsed, "resolved time axis");
    Ok(Resolved {
        table: resolved,
        source,
    })
}
