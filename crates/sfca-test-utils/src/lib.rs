//! Testing utilities for the SFCA workspace
//!
//! Raw-table builders and canned artifact tables. Everything here builds
//! text tables, the way they come off disk.

#![allow(missing_docs)]

use sfca_artifact::{Table, Value};

/// Raw columns written by [`raw_table`], after the time column
pub const RAW_COLUMNS: [&str; 4] = ["neighborhood", "incident_category", "weekday_label", "hour"];

/// One raw incident, all fields as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIncident {
    pub time: String,
    pub neighborhood: String,
    pub category: String,
    pub weekday: String,
    pub hour: String,
}

impl RawIncident {
    /// Incident at `time` with placeholder labels
    pub fn at(time: &str) -> Self {
        Self {
            time: time.to_string(),
            neighborhood: "Mission".to_string(),
            category: "Theft".to_string(),
            weekday: "Monday".to_string(),
            hour: "12".to_string(),
        }
    }

    #[must_use]
    pub fn neighborhood(mut self, neighborhood: &str) -> Self {
        self.neighborhood = neighborhood.to_string();
        self
    }

    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    #[must_use]
    pub fn weekday(mut self, weekday: &str) -> Self {
        self.weekday = weekday.to_string();
        self
    }

    #[must_use]
    pub fn hour(mut self, hour: &str) -> Self {
        self.hour = hour.to_string();
        self
    }

    /// `n` copies of this incident
    pub fn times(self, n: usize) -> Vec<Self> {
        vec![self; n]
    }

    fn cells(&self) -> Vec<Value> {
        [
            &self.time,
            &self.neighborhood,
            &self.category,
            &self.weekday,
            &self.hour,
        ]
        .into_iter()
        .map(|s| Value::from_raw(s))
        .collect()
    }
}

/// Raw table with `time_column` followed by [`RAW_COLUMNS`]
pub fn raw_table(time_column: &str, incidents: &[RawIncident]) -> Table {
    let columns = std::iter::once(time_column).chain(RAW_COLUMNS);
    Table::from_rows(columns, incidents.iter().map(RawIncident::cells).collect())
        .expect("raw fixture is well formed")
}

/// Text table from string rows; blank cells become missing
pub fn text_table(columns: &[&str], rows: &[&[&str]]) -> Table {
    Table::from_rows(
        columns.iter().copied(),
        rows.iter()
            .map(|r| r.iter().map(|f| Value::from_raw(f)).collect())
            .collect(),
    )
    .expect("text fixture is well formed")
}

/// Mission in January 2024: three thefts and two assaults
pub fn mission_january() -> Table {
    let mut incidents = RawIncident::at("2024-01").category("Theft").times(3);
    incidents.extend(RawIncident::at("2024-01").category("Assault").times(2));
    raw_table("month", &incidents)
}

/// Stored citywide table from `(month, incidents)` pairs
pub fn citywide_table(rows: &[(&str, i64)]) -> Table {
    Table::from_rows(
        ["month", "incidents"],
        rows.iter()
            .map(|(m, n)| vec![Value::from_raw(m), Value::text(n.to_string())])
            .collect(),
    )
    .expect("citywide fixture is well formed")
}

/// Stored forecast table from `(month, forecast, lower, upper)` tuples
pub fn forecast_table(rows: &[(&str, f64, f64, f64)]) -> Table {
    Table::from_rows(
        ["month", "forecast", "lower", "upper"],
        rows.iter()
            .map(|(m, f, lo, hi)| {
                vec![
                    Value::from_raw(m),
                    Value::text(f.to_string()),
                    Value::text(lo.to_string()),
                    Value::text(hi.to_string()),
                ]
            })
            .collect(),
    )
    .expect("forecast fixture is well formed")
}
