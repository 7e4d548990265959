//! Grouping and counting
//!
//! Exact-match grouping on key tuples. Output rows are sorted by the key
//! tuple in declared key order and zero totals are never materialized:
//! an absent group means zero incidents.

use crate::time_axis::MONTH;
use crate::view::{HOURLY_RAW_COLUMNS, MONTHLY_RAW_COLUMNS};
use sfca_artifact::types::derive_year;
use sfca_artifact::{
    Artifact, ArtifactError, CitywideMonthly, HourWeekday, NeighborhoodCategoryMonthly,
    SchemaValidator, Table, Value, INCIDENTS,
};
use std::collections::BTreeMap;

/// What to group on and what to count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSpec<'a> {
    pub keys: &'a [&'a str],
    /// `None` counts rows, `Some(column)` sums an integer count column
    pub weight: Option<&'a str>,
}

impl<'a> AggregateSpec<'a> {
    /// Count rows per group
    #[must_use]
    pub const fn count(keys: &'a [&'a str]) -> Self {
        Self { keys, weight: None }
    }

    /// Sum `weight` per group
    #[must_use]
    pub const fn sum(keys: &'a [&'a str], weight: &'a str) -> Self {
        Self {
            keys,
            weight: Some(weight),
        }
    }

    /// Group `table` and emit `keys..., incidents`
    ///
    /// # Errors
    /// [`ArtifactError::MissingColumns`] if a key or the weight column is absent,
    /// [`ArtifactError::CountOverflow`] if a group total overflows
    pub fn apply(&self, table: &Table) -> Result<Table, ArtifactError> {
        let mut needed = self.keys.to_vec();
        needed.extend(self.weight);
        SchemaValidator::new().validate(table, "aggregate input", &needed)?;

        let key_idx: Vec<usize> = self
            .keys
            .iter()
            .filter_map(|k| table.column_index(k))
            .collect();
        let weight_idx = self.weight.and_then(|w| table.column_index(w));

        let mut groups: BTreeMap<Vec<Value>, i64> = BTreeMap::new();
        for row in table.rows() {
            let key = key_idx.iter().map(|&i| row[i].clone()).collect();
            let n = weight_idx.map_or(1, |i| row[i].as_int().unwrap_or(0));
            let total = groups.entry(key).or_default();
            *total = total
                .checked_add(n)
                .ok_or_else(|| ArtifactError::overflow("aggregate input", self.weight.unwrap_or(INCIDENTS)))?;
        }

        let columns = self.keys.iter().copied().chain(std::iter::once(INCIDENTS));
        let rows = groups
            .into_iter()
            .filter(|(_, n)| *n != 0)
            .map(|(mut key, n)| {
                key.push(Value::Int(n));
                key
            })
            .collect();
        Table::from_rows(columns, rows)
    }
}

/// Group `table` by `keys`
///
/// Sums the `incidents` column when the input already has one (re-aggregating
/// an aggregate to a coarser grouping), otherwise counts rows.
///
/// # Errors
/// [`ArtifactError::MissingColumns`] if a key is absent
pub fn aggregate(table: &Table, keys: &[&str]) -> Result<Table, ArtifactError> {
    let spec = if table.has_column(INCIDENTS) {
        AggregateSpec::sum(keys, INCIDENTS)
    } else {
        AggregateSpec::count(keys)
    };
    spec.apply(table)
}

/// Expand an aggregate into one row per counted incident, without `weight`
///
/// # Errors
/// [`ArtifactError::MissingColumns`] if `weight` is absent
pub fn explode(table: &Table, weight: &str) -> Result<Table, ArtifactError> {
    let Some(weight_idx) = table.column_index(weight) else {
        return Err(ArtifactError::MissingColumns {
            artifact: "explode input".to_string(),
            missing: vec![weight.to_string()],
        });
    };
    let columns = table.columns().filter(|c| *c != weight);
    let mut rows = Vec::new();
    for row in table.rows() {
        let n = row[weight_idx].as_int().unwrap_or(0).max(0);
        let cells: Vec<Value> = row
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != weight_idx)
            .map(|(_, v)| v.clone())
            .collect();
        for _ in 0..n {
            rows.push(cells.clone());
        }
    }
    Table::from_rows(columns, rows)
}

/// Citywide monthly totals from the normalized monthly frame
///
/// # Errors
/// Shape or invariant failure
pub fn citywide_monthly(frame: &Table) -> Result<Artifact<CitywideMonthly>, ArtifactError> {
    Artifact::new(aggregate(frame, &[MONTH])?)
}

/// Neighborhood×category monthly totals from the normalized monthly frame
///
/// `year` always comes from the canonical month.
///
/// # Errors
/// Shape or invariant failure
pub fn neighborhood_category_monthly(
    frame: &Table,
) -> Result<Artifact<NeighborhoodCategoryMonthly>, ArtifactError> {
    let keys = [MONTH, MONTHLY_RAW_COLUMNS[0], MONTHLY_RAW_COLUMNS[1]];
    let mut grouped = aggregate(frame, &keys)?;
    derive_year(&mut grouped)?;
    Artifact::new(grouped.select(&[
        MONTH,
        "year",
        "neighborhood",
        "incident_category",
        INCIDENTS,
    ])?)
}

/// Hour×weekday totals from the normalized hourly frame
///
/// # Errors
/// Shape or invariant failure
pub fn hourly_weekday(frame: &Table) -> Result<Artifact<HourWeekday>, ArtifactError> {
    Artifact::new(aggregate(frame, HOURLY_RAW_COLUMNS)?)
}
