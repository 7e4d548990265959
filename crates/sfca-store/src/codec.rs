//! CSV codec
//!
//! Header row carries the column names; cells are written in their
//! canonical text form and read back as text (blank → missing). Typing is
//! restored by the normalizer on the read path.

use crate::error::StoreResult;
use sfca_artifact::{Table, Value};
use std::io::{Read, Write};

/// Write `table` as CSV
///
/// # Errors
/// CSV or IO failure from the underlying writer
pub fn write_csv<W: Write>(table: &Table, writer: W) -> StoreResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(ToString::to_string))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read a CSV stream into a text table
///
/// # Errors
/// - CSV syntax errors or rows with a different field count
/// - duplicate header names
pub fn read_csv<R: Read>(reader: R) -> StoreResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut table = Table::new(headers.iter())?;
    for record in rdr.records() {
        let record = record?;
        table.push_row(record.iter().map(Value::from_raw).collect())?;
    }
    Ok(table)
}

/// Encode `table` to an in-memory CSV string
///
/// # Errors
/// CSV failure
pub fn to_csv_string(table: &Table) -> StoreResult<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
