pub mod handler;

use clap::Args;

use crate::config::Overrides;

pub use handler::handle_clear_command;

#[derive(Args)]
pub struct ClearCommands {
    /// Target table
    #[arg(short, long)]
    pub table: Option<String>,

    /// Identifier column; every row with a non-empty value is deleted
    #[arg(long)]
    pub key_column: Option<String>,

    /// Answer the confirmation non-interactively (must be exactly "DELETE ALL")
    #[arg(long, value_name = "PHRASE")]
    pub confirm: Option<String>,
}

impl ClearCommands {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            table: self.table.clone(),
            key_column: self.key_column.clone(),
            ..Default::default()
        }
    }
}
