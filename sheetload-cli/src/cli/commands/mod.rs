//! Subcommand arguments and handlers

pub mod clear;
pub mod inspect;
pub mod upload;

use anyhow::{Context, Result};
use colored::*;

use crate::api::{MemoryTableStore, RestTableStore, TableStore};
use crate::config::Config;

pub const RULE_WIDTH: usize = 60;

/// Open the configured store, or an in-memory one for dry runs
pub fn open_store(config: &Config, dry_run: bool) -> Result<Box<dyn TableStore>> {
    if dry_run {
        return Ok(Box::new(MemoryTableStore::new(config.key_column.as_str())));
    }
    let (url, key) = config.credentials()?;
    let store = RestTableStore::new(url, key, config.resilience.clone())?;
    Ok(Box::new(store))
}

/// Fail fast when the store or table cannot be reached
pub async fn check_connection(store: &dyn TableStore, table: &str) -> Result<()> {
    println!("Connecting to {}...", store.describe().cyan());
    store
        .ping(table)
        .await
        .with_context(|| format!("Failed to reach table '{}'", table))?;
    println!("{} Connected successfully\n", "✓".green());
    Ok(())
}

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}
