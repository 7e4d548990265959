//! Neighborhood×Category Monthly: `(month, year, neighborhood, incident_category) → incidents`

use super::{dates, ints, labels, INCIDENTS};
use crate::artifact::{private, ArtifactKind};
use crate::error::ArtifactError;
use crate::schema::{ColumnKind, ColumnRule};
use crate::table::{Table, Value};
use chrono::Datelike;

/// Add or overwrite an integer `year` column taken from `month`
///
/// # Errors
/// [`ArtifactError::MissingColumns`] if there is no `month` column
pub fn derive_year(table: &mut Table) -> Result<(), ArtifactError> {
    let years: Vec<Value> = match table.column("month") {
        Some(cells) => cells
            .map(|m| m.as_date().map_or(Value::Missing, |d| Value::Int(i64::from(d.year()))))
            .collect(),
        None => {
            return Err(ArtifactError::MissingColumns {
                artifact: "year derivation".to_string(),
                missing: vec!["month".to_string()],
            })
        }
    };
    table.set_column("year", years)
}

/// Monthly totals per neighborhood and category
///
/// # Invariants
/// - `year` is the year of `month`
/// - rows sorted by `(month, neighborhood, incident_category)`, no duplicate tuple
/// - summed over neighborhood and category, reproduces the citywide count
///   for each month (checked across artifacts, not here)
#[derive(Debug, Clone, Copy)]
pub struct NeighborhoodCategoryMonthly;

impl private::Sealed for NeighborhoodCategoryMonthly {}

impl ArtifactKind for NeighborhoodCategoryMonthly {
    const NAME: &'static str = "monthly_neighborhood_category";
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["month", "year", "neighborhood", "incident_category", INCIDENTS];
    const COLUMN_RULES: &'static [ColumnRule] = &[
        ColumnRule::new("month", ColumnKind::Month),
        ColumnRule::new("neighborhood", ColumnKind::Label),
        ColumnRule::new("incident_category", ColumnKind::Label),
        ColumnRule::new(INCIDENTS, ColumnKind::Count),
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["month", "neighborhood", "incident_category"];

    fn complete(table: &mut Table) -> Result<(), ArtifactError> {
        derive_year(table)
    }

    fn validate_content(table: &Table) -> Result<(), ArtifactError> {
        let months = dates(table, Self::NAME, "month")?;
        let years = ints(table, Self::NAME, "year")?;
        let hoods = labels(table, Self::NAME, "neighborhood")?;
        let cats = labels(table, Self::NAME, "incident_category")?;
        ints(table, Self::NAME, INCIDENTS)?;

        if let Some((row, (m, y))) = months
            .iter()
            .zip(&years)
            .enumerate()
            .find(|(_, (m, y))| i64::from(m.year()) != **y)
        {
            return Err(ArtifactError::invariant(
                Self::NAME,
                format!("row {row}: year {y} does not match month {m}"),
            ));
        }

        let keys: Vec<_> = months.iter().zip(&hoods).zip(&cats).collect();
        if let Some(row) = keys.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ArtifactError::invariant(
                Self::NAME,
                format!(
                    "rows {row} and {} out of order or duplicated on (month, neighborhood, incident_category)",
                    row + 1
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Artifact;
    use chrono::NaiveDate;

    fn row(m: u32, year: i64, hood: &str, cat: &str, n: i64) -> Vec<Value> {
        vec![
            Value::Date(NaiveDate::from_ymd_opt(2024, m, 1).unwrap()),
            Value::Int(year),
            Value::text(hood),
            Value::text(cat),
            Value::Int(n),
        ]
    }

    fn table(rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(
            ["month", "year", "neighborhood", "incident_category", "incidents"],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn accepts_sorted_unique_rows() {
        let t = table(vec![
            row(1, 2024, "Mission", "Assault", 2),
            row(1, 2024, "Mission", "Theft", 3),
            row(2, 2024, "Bayview", "Theft", 1),
        ]);
        assert!(Artifact::<NeighborhoodCategoryMonthly>::new(t).is_ok());
    }

    #[test]
    fn rejects_year_month_disagreement() {
        let t = table(vec![row(1, 2023, "Mission", "Theft", 3)]);
        let err = Artifact::<NeighborhoodCategoryMonthly>::new(t).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn rejects_duplicate_key_tuple() {
        let t = table(vec![
            row(1, 2024, "Mission", "Theft", 3),
            row(1, 2024, "Mission", "Theft", 1),
        ]);
        assert!(matches!(
            Artifact::<NeighborhoodCategoryMonthly>::new(t),
            Err(ArtifactError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn rejects_unsorted_rows() {
        let t = table(vec![
            row(2, 2024, "Mission", "Theft", 3),
            row(1, 2024, "Mission", "Theft", 1),
        ]);
        assert!(Artifact::<NeighborhoodCategoryMonthly>::new(t).is_err());
    }

    #[test]
    fn derive_year_overwrites_from_month() {
        let mut t = Table::from_rows(
            ["month", "year"],
            vec![
                vec![Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()), Value::text("1999")],
                vec![Value::Missing, Value::text("2024")],
            ],
        )
        .unwrap();
        derive_year(&mut t).unwrap();
        assert_eq!(t.cell(0, "year"), Some(&Value::Int(2024)));
        assert_eq!(t.cell(1, "year"), Some(&Value::Missing));
    }

    #[test]
    fn stored_year_is_recomputed_from_month() {
        let stored = Table::from_rows(
            ["month", "year", "neighborhood", "incident_category", "incidents"],
            vec![
                ["2024-01", "2024", "Mission", "Assault", "2"],
                ["2024-01", "n/a", "Mission", "Theft", "3"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(Value::from_raw).collect())
            .collect(),
        )
        .unwrap();
        let (artifact, audit) = Artifact::<NeighborhoodCategoryMonthly>::from_stored(&stored).unwrap();
        assert_eq!(audit.rows_out, 2);
        assert_eq!(artifact.table().cell(1, "year"), Some(&Value::Int(2024)));
    }
}
