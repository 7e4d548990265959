//! Citywide Monthly: `month → incidents`

use super::{dates, ints, strictly_increasing, INCIDENTS};
use crate::artifact::{private, ArtifactKind};
use crate::error::ArtifactError;
use crate::schema::{ColumnKind, ColumnRule};
use crate::table::Table;

/// Citywide monthly totals
///
/// # Invariants
/// - months strictly increasing, no duplicate month
#[derive(Debug, Clone, Copy)]
pub struct CitywideMonthly;

impl private::Sealed for CitywideMonthly {}

impl ArtifactKind for CitywideMonthly {
    const NAME: &'static str = "monthly_citywide";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["month", INCIDENTS];
    const COLUMN_RULES: &'static [ColumnRule] = &[
        ColumnRule::new("month", ColumnKind::Month),
        ColumnRule::new(INCIDENTS, ColumnKind::Count),
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["month"];

    fn validate_content(table: &Table) -> Result<(), ArtifactError> {
        let months = dates(table, Self::NAME, "month")?;
        ints(table, Self::NAME, INCIDENTS)?;
        strictly_increasing(Self::NAME, &months)
    }
}
