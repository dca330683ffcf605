//! Inspect command handler

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use super::InspectCommands;
use crate::config::Config;
use crate::ingest::{clean, inspect, preview, probe_record, read_dataset};

/// Print the inspection report and a preview; never contacts the store
pub async fn handle_inspect_command(args: InspectCommands, config_path: Option<&Path>) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(config_path, args.overrides())?;

    let dataset = read_dataset(&args.file, config.sheet.as_deref())
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    println!(
        "{} {} rows and {} columns from {}",
        "✓".green(),
        dataset.len(),
        dataset.columns().len(),
        args.file.display().to_string().cyan()
    );

    println!("{}\n", inspect(&dataset, &config.key_column));

    if args.rows > 0 && !dataset.is_empty() {
        println!("{}", preview(&dataset, args.rows));
    }

    let cleaned = clean(dataset);
    match cleaned.records().first().map(probe_record) {
        Some(Ok(_)) => println!("{} First row is JSON compatible", "✓".green()),
        Some(Err(err)) => println!("{} First row has issues: {}", "✗".red(), err),
        None => println!("{}", "File has no data rows".yellow()),
    }

    Ok(())
}
