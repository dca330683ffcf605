//! Upload command handler

use anyhow::{Context, Result};
use colored::*;
use log::warn;
use std::path::Path;
use std::time::Instant;

use super::UploadCommands;
use crate::api::TableStore;
use crate::cli::commands::{check_connection, open_store, rule};
use crate::config::Config;
use crate::ingest::{Record, clean, inspect, preview, probe_record, read_dataset};
use crate::prompt::{CliPrompt, Prompt};
use crate::upload::{FailureKind, UploadOptions, UploadReport, Uploader, clear_table};

const PREVIEW_ROWS: usize = 3;

/// Read, clean and upload a spreadsheet
pub async fn handle_upload_command(args: UploadCommands, config_path: Option<&Path>) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(config_path, args.overrides())?;
    let store = open_store(&config, args.dry_run)?;
    if args.dry_run {
        println!(
            "{}",
            "Dry run: writes go to an in-memory table and are discarded".yellow()
        );
    }
    check_connection(store.as_ref(), &config.table).await?;

    println!("Reading file: {}...", args.file.display().to_string().cyan());
    let dataset = read_dataset(&args.file, config.sheet.as_deref())
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    println!(
        "{} Loaded {} rows and {} columns\n",
        "✓".green(),
        dataset.len(),
        dataset.columns().len()
    );

    if dataset.is_empty() {
        println!("{}", "Nothing to upload.".yellow());
        return Ok(());
    }

    println!("{}\n", inspect(&dataset, &config.key_column));
    println!("{}", preview(&dataset, PREVIEW_ROWS));

    println!("Cleaning data...");
    let dataset = clean(dataset);
    println!("{} Data cleaned\n", "✓".green());

    println!("Testing first row for JSON compatibility...");
    if let Some(first) = dataset.records().first() {
        if let Err(err) = probe_record(first) {
            println!("{} First row has issues: {}", "✗".red(), err);
            println!("Problematic row data:");
            println!(
                "{}",
                serde_json::to_string_pretty(&first.to_json_lossy())
                    .context("Failed to render row")?
            );
            anyhow::bail!("First row is not JSON compatible: {}", err);
        }
    }
    println!("{} First row is JSON compatible\n", "✓".green());

    println!("{}", rule());
    println!(
        "UPLOAD MODE: {}",
        config.mode.name().to_uppercase().bright_green().bold()
    );
    println!("{}", rule());
    println!("{}", config.mode.description());

    let prompt = CliPrompt::new(args.yes, args.confirm.clone());
    let started = Instant::now();
    let Some(report) = run_upload(store.as_ref(), &prompt, &config, dataset.records()).await?
    else {
        println!("Upload cancelled.");
        return Ok(());
    };

    print_summary(&report);
    println!(
        "{}",
        format!("Elapsed: {:.1}s", started.elapsed().as_secs_f64()).dimmed()
    );
    Ok(())
}

/// Clear the table when the mode asks for it, pass the continue gate, then upload.
///
/// Returns `None` when either gate is declined or the clear fails; nothing is
/// written in that case.
pub async fn run_upload<S: TableStore + ?Sized>(
    store: &S,
    prompt: &dyn Prompt,
    config: &Config,
    records: &[Record],
) -> Result<Option<UploadReport>> {
    if config.mode.clears_table()
        && !clear_table(store, &config.table, &config.key_column, prompt).await
    {
        return Ok(None);
    }

    let question = format!(
        "\nReady to upload {} rows to table '{}'. Continue?",
        records.len(),
        config.table
    );
    let proceed = prompt.confirm_continue(&question).unwrap_or_else(|err| {
        warn!("Could not read confirmation: {:#}", err);
        false
    });
    if !proceed {
        return Ok(None);
    }

    let report = Uploader::new(store, UploadOptions::from_config(config))
        .upload(records, config.mode.write_mode())
        .await?;
    Ok(Some(report))
}

fn print_summary(report: &UploadReport) {
    println!("\n{}", rule());
    println!("{}", "Upload Complete!".bold());
    println!("Total rows: {}", report.total);
    println!("Successful: {}", report.successful.to_string().green());
    if !report.is_clean() {
        println!("Failed: {}", report.failed.to_string().red());
        println!(
            "  duplicates: {}, JSON errors: {}, other: {}",
            report.count_of(FailureKind::Duplicate),
            report.count_of(FailureKind::Json),
            report.count_of(FailureKind::Store)
        );
    } else {
        println!("Failed: {}", report.failed);
    }
    println!("{}", rule());

    if let Some(path) = &report.failures_file {
        println!(
            "\n{} Failed rows saved for review: {}",
            "✓".green(),
            path.display().to_string().cyan()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryTableStore, Operation};
    use crate::ingest::Value;
    use crate::upload::UploadMode;
    use serde_json::json;
    use std::time::Duration;

    struct Answers {
        phrase: &'static str,
        proceed: bool,
    }

    impl Prompt for Answers {
        fn confirm_phrase(&self, _message: &str) -> Result<String> {
            Ok(self.phrase.to_string())
        }

        fn confirm_continue(&self, _message: &str) -> Result<bool> {
            Ok(self.proceed)
        }
    }

    fn replace_config(dir: &tempfile::TempDir) -> Config {
        Config {
            table: "coatings".to_string(),
            key_column: "sku".to_string(),
            mode: UploadMode::Replace,
            batch_delay: Duration::ZERO,
            failures_file: dir.path().join("failed_rows.json"),
            ..Config::default()
        }
    }

    async fn seeded_store() -> MemoryTableStore {
        let store = MemoryTableStore::new("sku");
        let old = json!({"sku": "OLD", "price": 1});
        store
            .execute(&Operation::insert(
                "coatings",
                vec![old.as_object().cloned().unwrap()],
            ))
            .await
            .unwrap();
        store
    }

    fn records() -> Vec<Record> {
        ["N1", "N2"]
            .iter()
            .map(|sku| {
                Record::new()
                    .with("sku", Value::String(sku.to_string()))
                    .with("price", Value::Int(5))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_replace_clears_then_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store().await;
        let prompt = Answers {
            phrase: "DELETE ALL",
            proceed: true,
        };

        let report = run_upload(&store, &prompt, &replace_config(&dir), &records())
            .await
            .unwrap()
            .expect("upload should run");

        assert_eq!(report.successful, 2);
        assert!(report.is_clean());
        let skus: Vec<_> = store
            .rows("coatings")
            .iter()
            .map(|row| row["sku"].clone())
            .collect();
        assert_eq!(skus, vec![json!("N1"), json!("N2")]);
    }

    #[tokio::test]
    async fn test_replace_wrong_phrase_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store().await;
        let prompt = Answers {
            phrase: "delete all",
            proceed: true,
        };

        let report = run_upload(&store, &prompt, &replace_config(&dir), &records())
            .await
            .unwrap();

        assert!(report.is_none());
        let stored = store.rows("coatings");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["sku"], json!("OLD"));
    }

    #[tokio::test]
    async fn test_declined_continue_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryTableStore::new("sku");
        let config = Config {
            mode: UploadMode::Insert,
            ..replace_config(&dir)
        };
        let prompt = Answers {
            phrase: "",
            proceed: false,
        };

        let report = run_upload(&store, &prompt, &config, &records()).await.unwrap();

        assert!(report.is_none());
        assert!(store.rows("coatings").is_empty());
    }
}
