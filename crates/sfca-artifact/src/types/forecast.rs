//! Forecast: `month → (forecast, lower, upper)`
//!
//! Produced by an external model; only its shape is checked here.

use super::{dates, measures, strictly_increasing};
use crate::artifact::{private, ArtifactKind};
use crate::error::ArtifactError;
use crate::schema::{ColumnKind, ColumnRule};
use crate::table::Table;
use crate::time::next_month;

/// Citywide monthly forecast series
///
/// # Invariants
/// - `lower <= forecast <= upper` on every row where all three are present
/// - months strictly increasing and contiguous
#[derive(Debug, Clone, Copy)]
pub struct Forecast;

impl private::Sealed for Forecast {}

impl ArtifactKind for Forecast {
    const NAME: &'static str = "forecast_citywide_monthly";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["month", "forecast", "lower", "upper"];
    const COLUMN_RULES: &'static [ColumnRule] = &[
        ColumnRule::new("month", ColumnKind::Month),
        ColumnRule::new("forecast", ColumnKind::Measure),
        ColumnRule::new("lower", ColumnKind::Measure),
        ColumnRule::new("upper", ColumnKind::Measure),
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["month"];
    const LOAD_ORDER: &'static [&'static str] = &["month"];

    fn validate_content(table: &Table) -> Result<(), ArtifactError> {
        let months = dates(table, Self::NAME, "month")?;
        strictly_increasing(Self::NAME, &months)?;
        if let Some(w) = months.windows(2).find(|w| next_month(w[0]) != Some(w[1])) {
            return Err(ArtifactError::invariant(
                Self::NAME,
                format!("months must be contiguous: gap between {} and {}", w[0], w[1]),
            ));
        }

        let forecast = measures(table, Self::NAME, "forecast")?;
        let lower = measures(table, Self::NAME, "lower")?;
        let upper = measures(table, Self::NAME, "upper")?;
        for (row, ((f, lo), hi)) in forecast.iter().zip(&lower).zip(&upper).enumerate() {
            if let (Some(f), Some(lo), Some(hi)) = (f, lo, hi) {
                if !(lo <= f && f <= hi) {
                    return Err(ArtifactError::invariant(
                        Self::NAME,
                        format!(
                            "row {row} ({}): expected lower <= forecast <= upper, got {lo} / {f} / {hi}",
                            months[row]
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}
