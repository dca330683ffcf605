//! Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::clear::ClearCommands;
use commands::inspect::InspectCommands;
use commands::upload::UploadCommands;

#[derive(Parser)]
#[command(name = "sheetload")]
#[command(about = "Load spreadsheet product records into a hosted PostgREST table")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show request-level debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a spreadsheet and upload it in batches
    Upload(UploadCommands),
    /// Report column types, missing values and duplicate keys without uploading
    Inspect(InspectCommands),
    /// Delete every row of the target table
    Clear(ClearCommands),
}
