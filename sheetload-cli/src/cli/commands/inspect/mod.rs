pub mod handler;

use clap::Args;
use std::path::PathBuf;

use crate::config::Overrides;

pub use handler::handle_inspect_command;

#[derive(Args)]
pub struct InspectCommands {
    /// Spreadsheet to inspect
    pub file: PathBuf,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Column checked for duplicate values
    #[arg(long)]
    pub key_column: Option<String>,

    /// Number of rows to preview
    #[arg(short, long, default_value_t = 3)]
    pub rows: usize,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl InspectCommands {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            key_column: self.key_column.clone(),
            sheet: self.sheet.clone(),
            ..Default::default()
        }
    }
}
