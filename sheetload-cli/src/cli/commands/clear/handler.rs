//! Clear command handler

use anyhow::Result;
use colored::*;
use std::path::Path;

use super::ClearCommands;
use crate::cli::commands::{check_connection, open_store};
use crate::config::Config;
use crate::prompt::CliPrompt;
use crate::upload::clear_table;

pub async fn handle_clear_command(args: ClearCommands, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path, args.overrides())?;
    let store = open_store(&config, false)?;
    check_connection(store.as_ref(), &config.table).await?;

    let prompt = CliPrompt::new(false, args.confirm.clone());
    if clear_table(store.as_ref(), &config.table, &config.key_column, &prompt).await {
        println!("{} Table '{}' is empty", "✓".green(), config.table.bold());
    } else {
        println!("{}", "Table was not cleared.".yellow());
    }
    Ok(())
}
