//! Read-only diagnostics over a loaded dataset
//!
//! Nothing here feeds back into cleaning or upload; the report is printed
//! so problems (nulls, infinities, repeated keys) are visible up front.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::{Dataset, Value};

/// Maximum number of duplicated key values listed in the report
pub const DUPLICATE_SAMPLE_LIMIT: usize = 10;

/// Number of column names listed in the preview header
const PREVIEW_COLUMN_LIMIT: usize = 10;

/// Width at which preview cells are cut off
const PREVIEW_CELL_WIDTH: usize = 30;

const RULE_WIDTH: usize = 60;

/// Summary of one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    /// `int`, `float`, `string`, `bool`, `datetime`, `sequence`, `bytes`, `mixed` or `empty`
    pub type_label: &'static str,
    /// Nulls plus NaN values
    pub null_count: usize,
    /// Infinite values, only reported for numeric columns
    pub inf_count: Option<usize>,
}

/// Repeated values of the key column
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateSummary {
    pub key_column: String,
    /// Rows whose key already appeared in an earlier row
    pub count: usize,
    /// Distinct duplicated keys in first-seen order, capped at [`DUPLICATE_SAMPLE_LIMIT`]
    pub samples: Vec<String>,
}

/// Full inspection output
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionReport {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    /// None when the dataset has no key column
    pub duplicates: Option<DuplicateSummary>,
}

/// Inspect column types, missing values and duplicate keys
pub fn inspect(dataset: &Dataset, key_column: &str) -> InspectionReport {
    let columns = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| summarize_column(dataset, idx, name))
        .collect();

    let duplicates = dataset
        .column_index(key_column)
        .map(|idx| find_duplicates(dataset, idx, key_column));

    InspectionReport {
        rows: dataset.len(),
        columns,
        duplicates,
    }
}

fn summarize_column(dataset: &Dataset, idx: usize, name: &str) -> ColumnSummary {
    let mut labels = BTreeSet::new();
    let mut null_count = 0;
    let mut inf_count = 0;

    for value in dataset.column_values(idx) {
        if value.is_na() {
            null_count += 1;
        }
        match value {
            Value::Null => {}
            Value::Float(f) if f.is_infinite() => {
                inf_count += 1;
                labels.insert(value.type_label());
            }
            other => {
                labels.insert(other.type_label());
            }
        }
    }

    let type_label = column_type_label(&labels);
    let numeric = matches!(type_label, "int" | "float");

    ColumnSummary {
        name: name.to_string(),
        type_label,
        null_count,
        inf_count: numeric.then_some(inf_count),
    }
}

fn column_type_label(labels: &BTreeSet<&'static str>) -> &'static str {
    let labels: Vec<_> = labels.iter().copied().collect();
    match labels.as_slice() {
        [] => "empty",
        [single] => *single,
        ["float", "int"] => "float",
        _ => "mixed",
    }
}

fn find_duplicates(dataset: &Dataset, idx: usize, key_column: &str) -> DuplicateSummary {
    // key -> (first row index, occurrences)
    let mut seen: HashMap<(&'static str, String), (usize, usize)> = HashMap::new();
    let mut count = 0;

    for (row, value) in dataset.column_values(idx).enumerate() {
        let entry = seen
            .entry((value.type_label(), value.to_string()))
            .or_insert((row, 0));
        entry.1 += 1;
        if entry.1 > 1 {
            count += 1;
        }
    }

    let mut repeated: Vec<(usize, String)> = seen
        .into_iter()
        .filter(|(_, (_, occurrences))| *occurrences > 1)
        .map(|((_, text), (first, _))| (first, text))
        .collect();
    repeated.sort_unstable_by_key(|(first, _)| *first);

    DuplicateSummary {
        key_column: key_column.to_string(),
        count,
        samples: repeated
            .into_iter()
            .take(DUPLICATE_SAMPLE_LIMIT)
            .map(|(_, text)| text)
            .collect(),
    }
}

impl fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "DATA INSPECTION")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;
        writeln!(f, "Rows: {}, Columns: {}", self.rows, self.columns.len())?;

        let name_width = self
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0);

        writeln!(f)?;
        writeln!(f, "Data Types:")?;
        for column in &self.columns {
            writeln!(
                f,
                "  {:<width$}  {}",
                column.name,
                column.type_label,
                width = name_width
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Null/NaN counts per column:")?;
        let with_nulls: Vec<_> = self.columns.iter().filter(|c| c.null_count > 0).collect();
        if with_nulls.is_empty() {
            writeln!(f, "  No null values found")?;
        } else {
            for column in with_nulls {
                writeln!(
                    f,
                    "  {:<width$}  {}",
                    column.name,
                    column.null_count,
                    width = name_width
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Columns with inf values:")?;
        let with_inf: Vec<_> = self
            .columns
            .iter()
            .filter_map(|c| c.inf_count.filter(|n| *n > 0).map(|n| (c, n)))
            .collect();
        if with_inf.is_empty() {
            writeln!(f, "  No inf values found")?;
        } else {
            for (column, n) in with_inf {
                writeln!(f, "  {}: {} inf values", column.name, n)?;
            }
        }

        if let Some(dups) = &self.duplicates {
            writeln!(f)?;
            writeln!(
                f,
                "Duplicate '{}' values in file: {}",
                dups.key_column, dups.count
            )?;
            if dups.count > 0 {
                writeln!(f, "Duplicated values: [{}]", dups.samples.join(", "))?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", rule)
    }
}

/// Render the first `rows` records plus a column listing
pub fn preview(dataset: &Dataset, rows: usize) -> String {
    let mut out = format!("Preview of data (first {} rows):\n", rows);

    for (idx, record) in dataset.records().iter().take(rows).enumerate() {
        let cells: Vec<String> = record
            .iter()
            .map(|(column, value)| format!("{}={}", column, clip(&value.to_string())))
            .collect();
        out.push_str(&format!("  [{}] {}\n", idx, cells.join(", ")));
    }

    let listed: Vec<&str> = dataset
        .columns()
        .iter()
        .take(PREVIEW_COLUMN_LIMIT)
        .map(|c| c.as_str())
        .collect();
    let more = if dataset.columns().len() > PREVIEW_COLUMN_LIMIT {
        ", ..."
    } else {
        ""
    };
    out.push_str(&format!(
        "\nColumns ({}): [{}{}]\n",
        dataset.columns().len(),
        listed.join(", "),
        more
    ));

    out
}

fn clip(s: &str) -> String {
    if s.chars().count() > PREVIEW_CELL_WIDTH {
        let head: String = s.chars().take(PREVIEW_CELL_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
