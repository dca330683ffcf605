//! Upload modes

use clap::ValueEnum;
use serde::Deserialize;

use crate::api::WriteMode;

/// How a file is loaded into the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Insert new records only; existing keys fail
    Insert,
    /// Update existing records and insert new ones
    #[default]
    Upsert,
    /// Delete every row, then insert
    Replace,
}

impl UploadMode {
    /// Write semantics used for the batches themselves
    pub fn write_mode(&self) -> WriteMode {
        match self {
            UploadMode::Upsert => WriteMode::Upsert,
            UploadMode::Insert | UploadMode::Replace => WriteMode::Insert,
        }
    }

    pub fn clears_table(&self) -> bool {
        matches!(self, UploadMode::Replace)
    }

    pub fn name(&self) -> &'static str {
        match self {
            UploadMode::Insert => "insert",
            UploadMode::Upsert => "upsert",
            UploadMode::Replace => "replace",
        }
    }

    /// One-line explanation shown before the continue prompt
    pub fn description(&self) -> &'static str {
        match self {
            UploadMode::Insert => "This will INSERT new records only (will fail on duplicates).",
            UploadMode::Upsert => "This will UPDATE existing records and INSERT new ones.",
            UploadMode::Replace => "This will DELETE all existing data and insert new data.",
        }
    }
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
