//! The four derived views
//!
//! Each kind is a zero-sized marker implementing [`ArtifactKind`]; the
//! column contracts live in the associated constants so validation and
//! normalization are driven by one table instead of per-view branches.
//!
//! [`ArtifactKind`]: crate::ArtifactKind

mod citywide;
mod forecast;
mod hourly;
mod neighborhood;

pub use citywide::CitywideMonthly;
pub use forecast::Forecast;
pub use hourly::HourWeekday;
pub use neighborhood::{derive_year, NeighborhoodCategoryMonthly};

use crate::artifact::ArtifactKind;
use crate::error::ArtifactError;
use crate::table::{Table, Value};
use chrono::NaiveDate;

/// Name of the count column shared by every aggregate view
pub const INCIDENTS: &str = "incidents";

/// Logical names of all artifacts, in publish order
pub const ARTIFACT_NAMES: [&str; 4] = [
    CitywideMonthly::NAME,
    NeighborhoodCategoryMonthly::NAME,
    HourWeekday::NAME,
    Forecast::NAME,
];

fn typed<'t, T>(
    table: &'t Table,
    artifact: &str,
    column: &str,
    expected: &str,
    extract: impl Fn(&'t Value) -> Option<T>,
) -> Result<Vec<T>, ArtifactError> {
    let Some(cells) = table.column(column) else {
        return Err(ArtifactError::MissingColumns {
            artifact: artifact.to_string(),
            missing: vec![column.to_string()],
        });
    };
    cells
        .enumerate()
        .map(|(row, cell)| {
            extract(cell).ok_or_else(|| {
                ArtifactError::invariant(
                    artifact,
                    format!("row {row}: {column} must be {expected}, found '{cell}'"),
                )
            })
        })
        .collect()
}

pub(crate) fn dates(table: &Table, artifact: &str, column: &str) -> Result<Vec<NaiveDate>, ArtifactError> {
    typed(table, artifact, column, "a date", Value::as_date)
}

pub(crate) fn ints(table: &Table, artifact: &str, column: &str) -> Result<Vec<i64>, ArtifactError> {
    typed(table, artifact, column, "an integer", Value::as_int)
}

pub(crate) fn labels<'t>(
    table: &'t Table,
    artifact: &str,
    column: &str,
) -> Result<Vec<&'t str>, ArtifactError> {
    typed(table, artifact, column, "a label", Value::as_text)
}

/// Optional measures: a missing cell is `None`, any other non-number is an error
pub(crate) fn measures(
    table: &Table,
    artifact: &str,
    column: &str,
) -> Result<Vec<Option<f64>>, ArtifactError> {
    typed(table, artifact, column, "a number", |v| match v {
        Value::Missing => Some(None),
        other => other.as_float().map(Some),
    })
}

pub(crate) fn strictly_increasing(artifact: &str, months: &[NaiveDate]) -> Result<(), ArtifactError> {
    match months.windows(2).find(|w| w[0] >= w[1]) {
        Some(w) => Err(ArtifactError::invariant(
            artifact,
            format!("months must be strictly increasing: {} then {}", w[0], w[1]),
        )),
        None => Ok(()),
    }
}
