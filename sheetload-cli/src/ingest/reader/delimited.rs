//! CSV source files

use anyhow::{Context, Result};
use std::path::Path;

use super::unique_headers;
use crate::ingest::{Dataset, Value};

/// Text that spreadsheet tools conventionally treat as a missing value
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA",
    "NULL", "None", "n/a", "null",
];

/// Read a CSV file with a header row
pub fn read_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader
        .byte_headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut dataset = Dataset::new(unique_headers(headers));

    for (idx, row) in reader.byte_records().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row = row.with_context(|| format!("Failed to read CSV line {}", idx + 2))?;
        dataset.push_row(row.iter().map(parse_field).collect());
    }

    Ok(dataset)
}

/// Convert one raw CSV field into a typed value
fn parse_field(raw: &[u8]) -> Value {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(_) => return Value::Bytes(raw.to_vec()),
    };

    if text.is_empty() {
        return Value::Null;
    }

    let trimmed = text.trim();

    if NA_MARKERS.contains(&trimmed) {
        return Value::Float(f64::NAN);
    }

    match trimmed {
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }

    // Codes like "00123" are identifiers, not numbers
    if has_leading_zero(trimmed) {
        return Value::String(text.to_string());
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }

    // Whole numbers beyond i64 would lose digits as floats
    if is_integer_literal(trimmed) {
        return Value::String(text.to_string());
    }

    // Also accepts nan / inf / -inf / infinity
    if let Ok(f) = trimmed.parse::<f64>() {
        return Value::Float(f);
    }

    Value::String(text.to_string())
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut chars = digits.chars();
    matches!((chars.next(), chars.next()), (Some('0'), Some(c)) if c.is_ascii_digit())
}
