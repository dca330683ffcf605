//! Load a tabular source file into a [`Dataset`]
//!
//! The format is picked from the file extension:
//! - `.csv` goes through the CSV reader
//! - `.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods` go through calamine
//!
//! The first row always holds the column names.

mod delimited;
mod workbook;

use anyhow::{Result, bail};
use log::debug;
use std::collections::HashMap;
use std::path::Path;

use super::Dataset;

/// Read a dataset from a spreadsheet or CSV file.
///
/// `sheet` selects a worksheet by name; workbooks default to the first sheet.
/// Ignored for CSV files.
pub fn read_dataset<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<Dataset> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "csv" => delimited::read_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => workbook::read_workbook(path, sheet)?,
        "" => bail!("Cannot tell the format of {}: no file extension", path.display()),
        other => bail!("Unsupported file type '.{}': {}", other, path.display()),
    };

    debug!(
        "Read {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );

    Ok(dataset)
}

/// Turn raw header cells into unique column names.
///
/// Blank headers become `Unnamed: {index}`, repeated names get a `.{n}` suffix
/// (`price`, `price.1`, `price.2`).
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let name = name.trim().to_string();
        let base = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let count = seen.entry(base.clone()).or_insert(0);
        let header = if *count == 0 {
            base.clone()
        } else {
            format!("{}.{}", base, count)
        };
        *count += 1;
        headers.push(header);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Value;
    use std::io::Write;

    #[test]
    fn test_unique_headers() {
        let headers = unique_headers(vec![
            "sku".to_string(),
            " price ".to_string(),
            "".to_string(),
            "price".to_string(),
            "price".to_string(),
        ]);
        assert_eq!(
            headers,
            vec!["sku", "price", "Unnamed: 2", "price.1", "price.2"]
        );
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        std::fs::write(&path, "sku\nA1\n").unwrap();

        let err = read_dataset(&path, None).unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn test_dispatches_csv_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Products.CSV");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "sku,qty").unwrap();
        writeln!(file, "A1,3").unwrap();

        let dataset = read_dataset(&path, None).unwrap();
        assert_eq!(dataset.columns(), &["sku".to_string(), "qty".to_string()]);
        assert_eq!(dataset.records()[0].get("qty"), Some(&Value::Int(3)));
    }
}
