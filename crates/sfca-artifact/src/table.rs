//! Tabular model
//!
//! A [`Table`] is an ordered set of named columns over rows of typed
//! [`Value`] cells. Raw inputs arrive as text cells; the normalizer turns
//! them into typed cells that the aggregator groups on.

use crate::error::ArtifactError;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexSet;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// Format used when rendering [`Value::Date`]
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used when rendering [`Value::Timestamp`]
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One typed cell
///
/// `Value` has a total order (variant rank first, then the payload; floats
/// compare with `total_cmp`) so that tuples of values can key a group.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent, empty or unparsable
    #[default]
    Missing,
    /// Free text (labels, raw fields)
    Text(String),
    /// Integer (counts, hours, years)
    Int(i64),
    /// Floating point measure (forecast values)
    Float(f64),
    /// Calendar date (canonical month keys)
    Date(NaiveDate),
    /// Full event timestamp
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Build a cell from a raw text field; blank fields become [`Value::Missing`]
    #[must_use]
    pub fn from_raw(field: &str) -> Self {
        if field.trim().is_empty() {
            Self::Missing
        } else {
            Self::Text(field.to_string())
        }
    }

    /// Text cell
    #[inline]
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Int(_) => 1,
            Self::Float(_) => 2,
            Self::Date(_) => 3,
            Self::Timestamp(_) => 4,
            Self::Text(_) => 5,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

/// Canonical text rendering, shared by the CSV codec and content hashing
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Timestamp(t) => write!(f, "{}", t.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

/// Ordered columns over rows of [`Value`]s
///
/// # Invariants
/// - Column names are unique
/// - Every row has exactly one cell per column
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: IndexSet<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns
    ///
    /// # Errors
    /// Returns [`ArtifactError::DuplicateColumn`] if a name repeats
    pub fn new<I, S>(columns: I) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for column in columns {
            let column = column.into();
            if !set.insert(column.clone()) {
                return Err(ArtifactError::DuplicateColumn(column));
            }
        }
        Ok(Self {
            columns: set,
            rows: Vec::new(),
        })
    }

    /// Create a table and fill it with rows
    ///
    /// # Errors
    /// Duplicate column names or ragged rows
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row
    ///
    /// # Errors
    /// Returns [`ArtifactError::RaggedRow`] if the row width differs
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ArtifactError> {
        if row.len() != self.columns.len() {
            return Err(ArtifactError::RaggedRow {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().cloned().collect()
    }

    #[inline]
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    #[inline]
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Cell at `row` in column `name`
    #[must_use]
    pub fn cell(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Project onto `columns`, in the requested order
    ///
    /// # Errors
    /// Returns [`ArtifactError::MissingColumns`] naming every absent column
    pub fn select(&self, columns: &[&str]) -> Result<Self, ArtifactError> {
        let mut missing: Vec<String> = columns
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| (*c).to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(ArtifactError::MissingColumns {
                artifact: "selection".to_string(),
                missing,
            });
        }

        let indices: Vec<usize> = columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Self::from_rows(columns.iter().copied(), rows)
    }

    /// Keep only rows matching `keep`
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Stable sort by the given key columns, in order; unknown columns are ignored
    pub fn sort_by_columns(&mut self, keys: &[&str]) {
        let indices: Vec<usize> = keys.iter().filter_map(|k| self.column_index(k)).collect();
        self.rows.sort_by(|a, b| {
            indices
                .iter()
                .map(|&i| a[i].cmp(&b[i]))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Add a column, or overwrite it in place if it exists
    ///
    /// # Errors
    /// Returns [`ArtifactError::RaggedRow`] if `values` does not have one cell per row
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), ArtifactError> {
        if values.len() != self.rows.len() {
            return Err(ArtifactError::RaggedRow {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        let name = name.into();
        match self.column_index(&name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.insert(name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Sum of an integer column; non-integer cells count as zero
    ///
    /// `None` if the total overflows.
    #[must_use]
    pub fn sum_int(&self, name: &str) -> Option<i64> {
        match self.column(name) {
            Some(cells) => cells
                .filter_map(Value::as_int)
                .try_fold(0i64, i64::checked_add),
            None => Some(0),
        }
    }
}

/// Order-sensitive equality on both columns and rows
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.columns.iter().eq(other.columns.iter()) && self.rows == other.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            ["month", "neighborhood", "incidents"],
            vec![
                vec![Value::text("2024-02"), Value::text("Mission"), Value::Int(4)],
                vec![Value::text("2024-01"), Value::text("Bayview"), Value::Int(2)],
                vec![Value::text("2024-01"), Value::text("Mission"), Value::Int(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_columns_rejected() {
        let result = Table::new(["a", "b", "a"]);
        assert!(matches!(result, Err(ArtifactError::DuplicateColumn(c)) if c == "a"));
    }

    #[test]
    fn ragged_rows_rejected() {
        let mut table = Table::new(["a", "b"]).unwrap();
        let result = table.push_row(vec![Value::Int(1)]);
        assert!(matches!(
            result,
            Err(ArtifactError::RaggedRow {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn blank_raw_fields_are_missing() {
        assert!(Value::from_raw("   ").is_missing());
        assert_eq!(Value::from_raw(" x "), Value::text(" x "));
    }

    #[test]
    fn value_order_is_total() {
        assert!(Value::Missing < Value::Int(0));
        assert!(Value::Int(5) < Value::Int(6));
        assert!(Value::Float(f64::NAN) == Value::Float(f64::NAN));
        assert!(Value::text("Assault") < Value::text("Theft"));
    }

    #[test]
    fn sort_by_columns_orders_by_key_tuple() {
        let mut table = sample();
        table.sort_by_columns(&["month", "neighborhood"]);
        let hoods: Vec<_> = table
            .column("neighborhood")
            .unwrap()
            .filter_map(Value::as_text)
            .collect();
        assert_eq!(hoods, vec!["Bayview", "Mission", "Mission"]);
    }

    #[test]
    fn select_reports_sorted_missing_columns() {
        let table = sample();
        let err = table.select(&["zeta", "month", "alpha"]).unwrap_err();
        match err {
            ArtifactError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["alpha".to_string(), "zeta".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn select_projects_in_requested_order() {
        let table = sample().select(&["incidents", "month"]).unwrap();
        assert_eq!(table.column_names(), vec!["incidents", "month"]);
        assert_eq!(table.cell(0, "incidents"), Some(&Value::Int(4)));
    }

    #[test]
    fn set_column_adds_then_overwrites() {
        let mut table = sample();
        table
            .set_column("year", vec![Value::Int(2024); 3])
            .unwrap();
        assert_eq!(table.width(), 4);
        table
            .set_column("year", vec![Value::Int(2023); 3])
            .unwrap();
        assert_eq!(table.width(), 4);
        assert_eq!(table.cell(2, "year"), Some(&Value::Int(2023)));
    }

    #[test]
    fn sum_int_totals_column() {
        assert_eq!(sample().sum_int("incidents"), Some(7));
        assert_eq!(sample().sum_int("absent"), Some(0));

        let huge = Table::from_rows(["incidents"], vec![vec![Value::Int(i64::MAX)], vec![Value::Int(1)]]).unwrap();
        assert_eq!(huge.sum_int("incidents"), None);
    }
}
