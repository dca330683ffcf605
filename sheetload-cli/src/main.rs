mod api;
mod cli;
mod config;
mod ingest;
mod prompt;
mod upload;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use std::io::Write;

use cli::commands::clear::handle_clear_command;
use cli::commands::inspect::handle_inspect_command;
use cli::commands::upload::handle_upload_command;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Upload(args) => handle_upload_command(args, config_path).await,
        Commands::Inspect(args) => handle_inspect_command(args, config_path).await,
        Commands::Clear(args) => handle_clear_command(args, config_path).await,
    }
}

/// Plain message lines at info by default; RUST_LOG still wins when set
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper_util", LevelFilter::Warn)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}
