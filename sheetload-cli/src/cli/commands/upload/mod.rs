pub mod handler;

use clap::Args;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::config::Overrides;
use crate::upload::UploadMode;

pub use handler::handle_upload_command;

#[derive(Args)]
pub struct UploadCommands {
    /// Spreadsheet to load (.xlsx, .xlsm, .xls, .xlsb, .ods or .csv)
    pub file: PathBuf,

    /// Target table
    #[arg(short, long)]
    pub table: Option<String>,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Unique identifier column, used as the upsert conflict target
    #[arg(long)]
    pub key_column: Option<String>,

    /// Records per bulk request
    #[arg(short, long)]
    pub batch_size: Option<NonZeroUsize>,

    /// insert, upsert (default) or replace
    #[arg(short, long, value_enum)]
    pub mode: Option<UploadMode>,

    /// Where to write rows that could not be uploaded
    #[arg(long)]
    pub failures_file: Option<PathBuf>,

    /// Skip the "Continue?" confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Answer the table-wipe confirmation non-interactively (must be exactly "DELETE ALL")
    #[arg(long, value_name = "PHRASE")]
    pub confirm: Option<String>,

    /// Run against an in-memory table instead of the configured store
    #[arg(long)]
    pub dry_run: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl UploadCommands {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            table: self.table.clone(),
            key_column: self.key_column.clone(),
            batch_size: self.batch_size.map(NonZeroUsize::get),
            mode: self.mode,
            sheet: self.sheet.clone(),
            failures_file: self.failures_file.clone(),
        }
    }
}
