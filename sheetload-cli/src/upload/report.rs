//! Upload results and the failure artifact

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Error text recorded for rows that could not be serialized
pub const JSON_ERROR: &str = "JSON error";

/// Longest store error text kept in a failure record
pub const ERROR_TEXT_LIMIT: usize = 200;

/// Why a single row was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The row has no JSON form
    Json,
    /// The store rejected the row's key as already present
    Duplicate,
    /// Any other store error
    Store,
}

/// One rejected row, as written to the failure artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    /// 0-based position in the loaded dataset
    pub row: usize,
    pub error: String,
    pub data: Map<String, Value>,
    #[serde(skip)]
    pub kind: FailureKind,
}

impl FailureRecord {
    pub fn json(row: usize, data: Map<String, Value>) -> Self {
        Self {
            row,
            error: JSON_ERROR.to_string(),
            data,
            kind: FailureKind::Json,
        }
    }

    pub fn store(row: usize, kind: FailureKind, error: &str, data: Map<String, Value>) -> Self {
        Self {
            row,
            error: truncate_chars(error, ERROR_TEXT_LIMIT),
            data,
            kind,
        }
    }
}

/// Outcome of an upload run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// In dataset order
    pub failures: Vec<FailureRecord>,
    /// Where the failures were written, if any were
    pub failures_file: Option<PathBuf>,
}

impl UploadReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self, count: usize) {
        self.successful += count;
    }

    pub fn record_failure(&mut self, failure: FailureRecord) {
        self.failed += 1;
        self.failures.push(failure);
    }

    pub fn count_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// First `limit` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Write failures as a pretty-printed JSON array
pub fn write_failures(path: &Path, failures: &[FailureRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(failures).context("Failed to serialize failed rows")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write failed rows to {}", path.display()))
}
