//! Workbook source files (xlsx, xls, ods)

use anyhow::{Context, Result};
use calamine::{Data, DataType, Reader, open_workbook_auto};
use std::path::Path;

use super::unique_headers;
use crate::ingest::{Dataset, Value};

/// Read one worksheet of a workbook into a dataset
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .with_context(|| format!("Workbook has no sheets: {}", path.display()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => return Ok(Dataset::default()),
    };

    let mut dataset = Dataset::new(unique_headers(headers));

    for row in rows {
        // Blank rows inside the used range carry no record
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        dataset.push_row(row.iter().map(cell_to_value).collect());
    }

    Ok(dataset)
}

/// Convert a workbook cell into a typed value.
///
/// Numbers stay as stored: xlsx keeps every number as a float, so whole-number
/// columns are recast later by the cleaner rather than cell by cell here.
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        // Durations are kept as a fraction of days
        Data::DateTime(dt) if dt.is_duration() => Value::Float(dt.as_f64()),
        Data::DateTime(dt) => match cell.as_datetime() {
            Some(parsed) => Value::DateTime(parsed),
            None => Value::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match cell.as_datetime() {
            Some(parsed) => Value::DateTime(parsed),
            None => Value::String(s.clone()),
        },
        Data::DurationIso(s) => Value::String(s.clone()),
        // #DIV/0!, #N/A and friends read as not-a-number
        Data::Error(_) => Value::Float(f64::NAN),
    }
}
