//! Type normalization
//!
//! Coerces declared columns to their canonical types. Per-row failures are
//! absorbed: unparsable cells fall back to a safe default, and rows that end
//! up without a value in a key column are dropped. Nothing here raises for a
//! bad row; the [`DropAudit`] makes the row-count delta observable instead.

use crate::error::ArtifactError;
use crate::schema::{ColumnKind, ColumnRule, SchemaValidator};
use crate::table::{Table, Value};
use crate::time::{canonical_weekday, month_start, parse_month};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row-count accounting for one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropAudit {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Rows dropped because a key column had no value, by column
    pub missing_key: BTreeMap<String, usize>,
    /// Rows dropped because the hour did not parse as an integer
    pub hour_invalid: usize,
    /// Rows dropped because the hour fell outside `[0,23]`
    pub hour_out_of_range: usize,
}

impl DropAudit {
    /// Total rows dropped
    #[inline]
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }

    fn log(&self, artifact: &str) {
        for (column, count) in &self.missing_key {
            tracing::debug!(artifact, column = %column, count, "dropped rows missing a key value");
        }
        if self.hour_invalid > 0 {
            tracing::debug!(artifact, count = self.hour_invalid, "dropped rows with unparsable hour");
        }
        if self.hour_out_of_range > 0 {
            tracing::debug!(artifact, count = self.hour_out_of_range, "dropped rows with hour outside 0-23");
        }
    }
}

/// Output of [`Normalizer::normalize`]
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: Table,
    pub audit: DropAudit,
}

/// Table-driven normalizer
///
/// One instance per input shape: the rules say how each column is coerced,
/// the keys say which columns a row cannot do without.
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    artifact: &'a str,
    rules: &'a [ColumnRule],
    keys: &'a [&'a str],
}

enum Coerced {
    Keep(Value),
    DropHourInvalid,
    DropHourRange,
}

impl<'a> Normalizer<'a> {
    #[must_use]
    pub fn new(artifact: &'a str, rules: &'a [ColumnRule], keys: &'a [&'a str]) -> Self {
        Self {
            artifact,
            rules,
            keys,
        }
    }

    /// Coerce `table` per the rules and drop rows missing a key value
    ///
    /// Columns without a rule pass through unchanged.
    ///
    /// # Errors
    /// Returns [`ArtifactError::MissingColumns`] if a ruled or key column is absent.
    /// Bad cells never produce an error.
    pub fn normalize(&self, table: &Table) -> Result<Normalized, ArtifactError> {
        let mut needed: Vec<&str> = self.rules.iter().map(|r| r.column).collect();
        needed.extend_from_slice(self.keys);
        SchemaValidator::new().validate(table, self.artifact, &needed)?;

        let ruled: Vec<(usize, ColumnKind)> = self
            .rules
            .iter()
            .filter_map(|r| table.column_index(r.column).map(|i| (i, r.kind)))
            .collect();
        let keyed: Vec<(usize, &str)> = self
            .keys
            .iter()
            .filter_map(|k| table.column_index(k).map(|i| (i, *k)))
            .collect();

        let mut audit = DropAudit {
            rows_in: table.len(),
            ..DropAudit::default()
        };
        let mut out = Table::new(table.columns())?;

        'rows: for row in table.rows() {
            let mut row = row.clone();
            for &(idx, kind) in &ruled {
                match coerce(&row[idx], kind) {
                    Coerced::Keep(value) => row[idx] = value,
                    Coerced::DropHourInvalid => {
                        audit.hour_invalid += 1;
                        continue 'rows;
                    }
                    Coerced::DropHourRange => {
                        audit.hour_out_of_range += 1;
                        continue 'rows;
                    }
                }
            }
            if let Some(&(_, column)) = keyed.iter().find(|(idx, _)| row[*idx].is_missing()) {
                *audit.missing_key.entry(column.to_string()).or_default() += 1;
                continue;
            }
            out.push_row(row)?;
        }

        audit.rows_out = out.len();
        audit.log(self.artifact);
        Ok(Normalized { table: out, audit })
    }
}

fn coerce(value: &Value, kind: ColumnKind) -> Coerced {
    let kept = match kind {
        ColumnKind::Month => match value {
            Value::Date(d) => Value::Date(month_start(*d)),
            Value::Timestamp(t) => Value::Date(month_start(t.date())),
            Value::Text(s) => parse_month(s).map_or(Value::Missing, Value::Date),
            _ => Value::Missing,
        },
        ColumnKind::Count => Value::Int(integral(value).unwrap_or(0)),
        ColumnKind::Hour => match integral(value) {
            None => return Coerced::DropHourInvalid,
            Some(h) if !(0..=23).contains(&h) => return Coerced::DropHourRange,
            Some(h) => Value::Int(h),
        },
        ColumnKind::Measure => match value {
            Value::Float(_) | Value::Int(_) => value
                .as_float()
                .filter(|f| f.is_finite())
                .map_or(Value::Missing, Value::Float),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map_or(Value::Missing, Value::Float),
            _ => Value::Missing,
        },
        ColumnKind::Label => match value {
            Value::Missing => Value::Missing,
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Value::Missing
                } else {
                    Value::text(trimmed)
                }
            }
            other => Value::Text(other.to_string()),
        },
        ColumnKind::Weekday => value
            .as_text()
            .and_then(canonical_weekday)
            .map_or(Value::Missing, Value::text),
    };
    Coerced::Keep(kept)
}

/// Integer view of a cell; integral floats such as `3.0` are accepted
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(value: &Value) -> Option<i64> {
    let float = match value {
        Value::Int(i) => return Some(*i),
        Value::Float(f) => *f,
        Value::Text(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(i);
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    (float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64)
        .then_some(float as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const HOURLY_RULES: &[ColumnRule] = &[
        ColumnRule::new("weekday_label", ColumnKind::Weekday),
        ColumnRule::new("hour", ColumnKind::Hour),
        ColumnRule::new("incident_category", ColumnKind::Label),
    ];
    const HOURLY_KEYS: &[&str] = &["weekday_label", "hour", "incident_category"];

    fn raw(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(
            columns.iter().copied(),
            rows.iter()
                .map(|r| r.iter().map(|f| Value::from_raw(f)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn hours_out_of_range_are_dropped_not_clamped() {
        let table = raw(
            &["weekday_label", "hour", "incident_category"],
            &[
                &["Monday", "0", "Theft"],
                &["Monday", "23", "Theft"],
                &["Monday", "24", "Theft"],
                &["Monday", "-1", "Theft"],
                &["Monday", "7.0", "Theft"],
            ],
        );
        let out = Normalizer::new("hourly", HOURLY_RULES, HOURLY_KEYS)
            .normalize(&table)
            .unwrap();
        let hours: Vec<_> = out.table.column("hour").unwrap().cloned().collect();
        assert_eq!(hours, vec![Value::Int(0), Value::Int(23), Value::Int(7)]);
        assert_eq!(out.audit.hour_out_of_range, 2);
        assert_eq!(out.audit.dropped(), 2);
    }

    #[test]
    fn unparsable_hours_are_dropped() {
        let table = raw(
            &["weekday_label", "hour", "incident_category"],
            &[&["Monday", "noon", "Theft"], &["Monday", "", "Theft"], &["Monday", "7.5", "Theft"]],
        );
        let out = Normalizer::new("hourly", HOURLY_RULES, HOURLY_KEYS)
            .normalize(&table)
            .unwrap();
        assert!(out.table.is_empty());
        assert_eq!(out.audit.hour_invalid, 3);
    }

    #[test]
    fn weekday_labels_are_canonicalized_or_dropped() {
        let table = raw(
            &["weekday_label", "hour", "incident_category"],
            &[&["fri", "3", "Theft"], &["Someday", "3", "Theft"]],
        );
        let out = Normalizer::new("hourly", HOURLY_RULES, HOURLY_KEYS)
            .normalize(&table)
            .unwrap();
        assert_eq!(out.table.cell(0, "weekday_label"), Some(&Value::text("Friday")));
        assert_eq!(out.audit.missing_key.get("weekday_label"), Some(&1));
    }

    #[test]
    fn counts_fall_back_to_zero() {
        let rules = [ColumnRule::new("incidents", ColumnKind::Count)];
        let table = raw(&["incidents"], &[&["12"], &["4.0"], &["many"], &[""]]);
        let out = Normalizer::new("counts", &rules, &[]).normalize(&table).unwrap();
        let counts: Vec<_> = out.table.column("incidents").unwrap().cloned().collect();
        assert_eq!(
            counts,
            vec![Value::Int(12), Value::Int(4), Value::Int(0), Value::Int(0)]
        );
        assert_eq!(out.audit.dropped(), 0);
    }

    #[test]
    fn measures_fall_back_to_missing() {
        let rules = [ColumnRule::new("lower", ColumnKind::Measure)];
        let table = raw(&["lower"], &[&["10.5"], &["nan"], &["n/a"]]);
        let out = Normalizer::new("forecast", &rules, &[]).normalize(&table).unwrap();
        let cells: Vec<_> = out.table.column("lower").unwrap().cloned().collect();
        assert_eq!(cells, vec![Value::Float(10.5), Value::Missing, Value::Missing]);
    }

    #[test]
    fn rows_missing_key_values_are_dropped_and_audited() {
        let rules = [
            ColumnRule::new("month", ColumnKind::Month),
            ColumnRule::new("neighborhood", ColumnKind::Label),
        ];
        let table = raw(
            &["month", "neighborhood"],
            &[
                &["2024-01", "Mission"],
                &["garbage", "Mission"],
                &["2024-01", "   "],
                &["2024-02-14", " Bayview "],
            ],
        );
        let out = Normalizer::new("monthly", &rules, &["month", "neighborhood"])
            .normalize(&table)
            .unwrap();
        assert_eq!(out.audit.rows_in, 4);
        assert_eq!(out.audit.rows_out, 2);
        assert_eq!(out.audit.missing_key.get("month"), Some(&1));
        assert_eq!(out.audit.missing_key.get("neighborhood"), Some(&1));
        assert_eq!(
            out.table.cell(1, "month"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()))
        );
        assert_eq!(out.table.cell(1, "neighborhood"), Some(&Value::text("Bayview")));
    }

    #[test]
    fn absent_ruled_column_is_a_shape_error() {
        let table = raw(&["weekday_label", "incident_category"], &[]);
        let err = Normalizer::new("hourly_weekday_counts", HOURLY_RULES, HOURLY_KEYS)
            .normalize(&table)
            .unwrap_err();
        assert_eq!(err.missing_columns(), Some(&["hour".to_string()][..]));
    }

    #[test]
    fn unruled_columns_pass_through() {
        let rules = [ColumnRule::new("hour", ColumnKind::Hour)];
        let table = raw(&["hour", "note"], &[&["5", " keep me "]]);
        let out = Normalizer::new("t", &rules, &[]).normalize(&table).unwrap();
        assert_eq!(out.table.cell(0, "note"), Some(&Value::text(" keep me ")));
    }
}
