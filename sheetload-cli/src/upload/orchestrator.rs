//! Batched upload with per-row fallback
//!
//! Each batch is sent as one bulk write. When that fails, every row of the
//! batch is retried on its own so one bad row costs only itself; rows that
//! still fail are classified and collected into the failure artifact.

use anyhow::Result;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;

use super::report::{FailureKind, FailureRecord, UploadReport, truncate_chars, write_failures};
use crate::api::{Operation, Row, TableStore, WriteMode};
use crate::config::Config;
use crate::ingest::{Record, SerializeError, chunk_records, prepare_batch, to_wire};

const BATCH_ERROR_PREVIEW: usize = 150;
const ROW_ERROR_PREVIEW: usize = 100;

/// Settings for one upload run
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    pub table: String,
    pub key_column: String,
    pub batch_size: usize,
    /// Pause after every batch
    pub batch_delay: Duration,
    pub failures_file: PathBuf,
}

impl UploadOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            table: config.table.clone(),
            key_column: config.key_column.clone(),
            batch_size: config.batch_size,
            batch_delay: config.batch_delay,
            failures_file: config.failures_file.clone(),
        }
    }
}

/// Drives an upload against a [`TableStore`]
pub struct Uploader<'a, S: TableStore + ?Sized> {
    store: &'a S,
    options: UploadOptions,
}

impl<'a, S: TableStore + ?Sized> Uploader<'a, S> {
    pub fn new(store: &'a S, options: UploadOptions) -> Self {
        Self { store, options }
    }

    /// Upload cleaned records in batches.
    ///
    /// Row-level failures are collected, never returned as errors. The only
    /// error is failing to write the failure artifact.
    pub async fn upload(&self, records: &[Record], mode: WriteMode) -> Result<UploadReport> {
        let batch_size = self.options.batch_size.max(1);
        let batches = chunk_records(records, batch_size);
        let total_batches = batches.len();
        let mut report = UploadReport::new(records.len());

        info!(
            "Starting upload of {} rows in batches of {} (mode: {})",
            records.len(),
            batch_size,
            mode.verb()
        );

        for (index, batch) in batches.into_iter().enumerate() {
            let position = BatchPosition {
                number: index + 1,
                total: total_batches,
                offset: index * batch_size,
            };
            self.upload_batch(batch, position, mode, &mut report).await;
            tokio::time::sleep(self.options.batch_delay).await;
        }

        info!(
            "Upload complete: {} total, {} successful, {} failed",
            report.total, report.successful, report.failed
        );

        if !report.failures.is_empty() {
            let path = &self.options.failures_file;
            info!(
                "Saving {} failed rows to '{}'",
                report.failures.len(),
                path.display()
            );
            write_failures(path, &report.failures)?;
            report.failures_file = Some(path.clone());
        }

        Ok(report)
    }

    async fn upload_batch(
        &self,
        batch: &[Record],
        position: BatchPosition,
        mode: WriteMode,
        report: &mut UploadReport,
    ) {
        let prepared = prepare_batch(batch);
        let wire: Vec<Result<Row, SerializeError>> = prepared.iter().map(to_wire).collect();

        let bulk_error = match wire.iter().cloned().collect::<Result<Vec<Row>, _>>() {
            Ok(rows) => match self.store.execute(&self.write(mode, rows)).await {
                Ok(()) => {
                    info!(
                        "✓ Batch {}/{} {} successfully ({} rows)",
                        position.number,
                        position.total,
                        mode.past_tense(),
                        batch.len()
                    );
                    report.record_success(batch.len());
                    return;
                }
                Err(err) => err.to_string(),
            },
            Err(err) => err.to_string(),
        };

        warn!(
            "✗ Batch {}/{} failed: {}",
            position.number,
            position.total,
            truncate_chars(&bulk_error, BATCH_ERROR_PREVIEW)
        );
        info!("  Attempting individual row {}...", mode.verb());

        for (idx, (record, row)) in prepared.iter().zip(wire).enumerate() {
            let row_number = position.offset + idx;
            match row {
                Err(err) => {
                    warn!(
                        "  ✗ Row {} - JSON serialization error: {}",
                        row_number,
                        truncate_chars(&err.to_string(), ROW_ERROR_PREVIEW)
                    );
                    report.record_failure(FailureRecord::json(row_number, record.to_json_lossy()));
                }
                Ok(row) => match self.store.execute(&self.write(mode, vec![row])).await {
                    Ok(()) => {
                        debug!("  Row {} ok", row_number);
                        report.record_success(1);
                    }
                    Err(err) => {
                        let kind = if err.is_duplicate_key() {
                            warn!(
                                "  ⚠ Row {} - Duplicate {}: {}",
                                row_number,
                                self.options.key_column,
                                record
                                    .key_text(&self.options.key_column)
                                    .unwrap_or_else(|| "unknown".to_string())
                            );
                            FailureKind::Duplicate
                        } else {
                            warn!(
                                "  ✗ Row {} failed: {}",
                                row_number,
                                truncate_chars(&err.to_string(), ROW_ERROR_PREVIEW)
                            );
                            FailureKind::Store
                        };
                        report.record_failure(FailureRecord::store(
                            row_number,
                            kind,
                            &err.to_string(),
                            record.to_json_lossy(),
                        ));
                    }
                },
            }
        }
    }

    fn write(&self, mode: WriteMode, rows: Vec<Row>) -> Operation {
        Operation::write(
            mode,
            self.options.table.as_str(),
            rows,
            self.options.key_column.as_str(),
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct BatchPosition {
    number: usize,
    total: usize,
    /// Dataset index of the batch's first record
    offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryTableStore, StoreError};
    use crate::ingest::Value;
    use crate::upload::report::JSON_ERROR;
    use async_trait::async_trait;
    use std::collections::HashSet;

    fn options(dir: &tempfile::TempDir, batch_size: usize) -> UploadOptions {
        UploadOptions {
            table: "coatings".to_string(),
            key_column: "sku".to_string(),
            batch_size,
            batch_delay: Duration::ZERO,
            failures_file: dir.path().join("failed_rows.json"),
        }
    }

    fn product(sku: &str, price: f64) -> Record {
        Record::new()
            .with("sku", Value::String(sku.to_string()))
            .with("price", Value::Float(price))
    }

    #[tokio::test]
    async fn test_clean_upload_single_bulk_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryTableStore::new("sku");
        let records: Vec<Record> = (0..7).map(|i| product(&format!("P{}", i), 1.0)).collect();

        let report = Uploader::new(&store, options(&dir, 3))
            .upload(&records, WriteMode::Insert)
            .await
            .unwrap();

        assert_eq!(report.total, 7);
        assert_eq!(report.successful, 7);
        assert!(report.is_clean());
        assert_eq!(report.failures_file, None);
        assert_eq!(store.rows("coatings").len(), 7);
    }

    #[tokio::test]
    async fn test_bulk_failure_recovered_row_by_row() {
        // the same key twice in one upsert request fails as a batch but
        // succeeds one row at a time
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryTableStore::new("sku");
        let records = vec![product("A", 1.0), product("B", 2.0), product("A", 3.0)];

        let report = Uploader::new(&store, options(&dir, 500))
            .upload(&records, WriteMode::Upsert)
            .await
            .unwrap();

        assert_eq!(report.successful, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(report.failures_file, None);
        assert!(!dir.path().join("failed_rows.json").exists());

        let stored = store.rows("coatings");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["price"], serde_json::json!(3.0));
    }

    #[tokio::test]
    async fn test_unserializable_row_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryTableStore::new("sku");
        let records = vec![
            product("A", 1.0),
            Record::new()
                .with("sku", Value::String("B".to_string()))
                .with("price", Value::Bytes(vec![0xff, 0xfe])),
            product("C", 3.0),
        ];

        let report = Uploader::new(&store, options(&dir, 500))
            .upload(&records, WriteMode::Insert)
            .await
            .unwrap();

        assert_eq!(report.successful, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].row, 1);
        assert_eq!(report.failures[0].error, JSON_ERROR);
        assert_eq!(report.count_of(FailureKind::Json), 1);
        assert!(report.failures_file.is_some());
    }

    #[tokio::test]
    async fn test_duplicates_on_insert_classified_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryTableStore::new("sku");
        store
            .execute(&Operation::insert(
                "coatings",
                vec![to_wire(&product("A", 1.0)).unwrap()],
            ))
            .await
            .unwrap();

        let records = vec![
            product("X", 1.0),
            product("Y", 1.0),
            product("A", 5.0),
            product("B", 2.0),
        ];
        let report = Uploader::new(&store, options(&dir, 2))
            .upload(&records, WriteMode::Insert)
            .await
            .unwrap();

        assert_eq!(report.successful, 3);
        assert_eq!(report.failed, 1);

        let failure = &report.failures[0];
        assert_eq!(failure.row, 2);
        assert_eq!(failure.kind, FailureKind::Duplicate);
        assert!(failure.error.contains("duplicate key"));
        assert_eq!(failure.data["sku"], serde_json::json!("A"));

        let path = report.failures_file.unwrap();
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved[0]["row"], serde_json::json!(2));
    }

    #[tokio::test]
    async fn test_upsert_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryTableStore::new("sku");
        let records: Vec<Record> = (0..5).map(|i| product(&format!("S{}", i), 2.5)).collect();
        let uploader = Uploader::new(&store, options(&dir, 2));

        uploader.upload(&records, WriteMode::Upsert).await.unwrap();
        let second = uploader.upload(&records, WriteMode::Upsert).await.unwrap();

        assert_eq!(second.failed, 0);
        let stored = store.rows("coatings");
        let keys: HashSet<String> = stored.iter().map(|r| r["sku"].to_string()).collect();
        assert_eq!(stored.len(), 5);
        assert_eq!(keys.len(), 5);
    }

    struct RejectingStore;

    #[async_trait]
    impl TableStore for RejectingStore {
        async fn execute(&self, _operation: &Operation) -> Result<(), StoreError> {
            Err(StoreError::from_response(
                400,
                r#"{"code":"PGRST204","message":"Could not find the 'colour' column of 'coatings' in the schema cache"}"#,
            ))
        }

        async fn ping(&self, _table: &str) -> Result<(), StoreError> {
            Ok(())
        }

        fn describe(&self) -> String {
            "rejecting".to_string()
        }
    }

    #[tokio::test]
    async fn test_generic_errors_keep_row_positions() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<Record> = (0..5).map(|i| product(&format!("R{}", i), 1.0)).collect();

        let report = Uploader::new(&RejectingStore, options(&dir, 2))
            .upload(&records, WriteMode::Insert)
            .await
            .unwrap();

        assert_eq!(report.successful, 0);
        assert_eq!(report.failed, 5);
        let rows: Vec<usize> = report.failures.iter().map(|f| f.row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3, 4]);
        assert_eq!(report.count_of(FailureKind::Store), 5);
        assert!(report.failures[0].error.contains("PGRST204"));
    }

    #[tokio::test]
    async fn test_artifact_write_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(&dir, 10);
        opts.failures_file = dir.path().join("missing").join("failed_rows.json");
        let records = vec![product("A", 1.0)];

        let result = Uploader::new(&RejectingStore, opts)
            .upload(&records, WriteMode::Insert)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryTableStore::new("sku");

        let report = Uploader::new(&store, options(&dir, 500))
            .upload(&[], WriteMode::Upsert)
            .await
            .unwrap();

        assert_eq!(report, UploadReport::new(0));
    }
}
