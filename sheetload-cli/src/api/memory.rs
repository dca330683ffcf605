//! In-memory table store used by `--dry-run` and tests
//!
//! Mirrors the Postgres behaviours the uploader depends on: a unique key
//! column, all-or-nothing writes per request, and the two errors a batch can
//! trip over (an existing key on insert, a key repeated inside one upsert).

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::error::UNIQUE_VIOLATION;
use super::operations::{Operation, Row};
use super::{StoreError, TableStore};

const CARDINALITY_VIOLATION: &str = "21000";

#[derive(Debug)]
pub struct MemoryTableStore {
    key_column: String,
    tables: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemoryTableStore {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of a table's rows in insertion order
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Row>>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn duplicate_error(&self, table: &str, key: &str) -> StoreError {
        StoreError::Api {
            status: 409,
            code: Some(UNIQUE_VIOLATION.to_string()),
            message: format!(
                "duplicate key value violates unique constraint \"{}_{}_key\"",
                table, self.key_column
            ),
            details: Some(format!("Key ({})=({}) already exists.", self.key_column, key)),
        }
    }

    fn insert(&self, table: &str, rows: &[Row]) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let existing = tables.entry(table.to_string()).or_default();

        let mut seen: HashSet<String> = existing
            .iter()
            .filter_map(|r| key_of(r, &self.key_column))
            .collect();
        for row in rows {
            if let Some(key) = key_of(row, &self.key_column) {
                if !seen.insert(key.clone()) {
                    return Err(self.duplicate_error(table, &key));
                }
            }
        }

        existing.extend(rows.iter().cloned());
        Ok(())
    }

    /// Merge rows into existing ones that share the `on_conflict` column
    fn upsert(&self, table: &str, rows: &[Row], on_conflict: &str) -> Result<(), StoreError> {
        let mut batch_keys = HashSet::new();
        for key in rows.iter().filter_map(|r| key_of(r, on_conflict)) {
            if !batch_keys.insert(key) {
                return Err(StoreError::Api {
                    status: 500,
                    code: Some(CARDINALITY_VIOLATION.to_string()),
                    message: "ON CONFLICT DO UPDATE command cannot affect row a second time"
                        .to_string(),
                    details: None,
                });
            }
        }

        let mut tables = self.lock();
        let existing = tables.entry(table.to_string()).or_default();
        for row in rows {
            let position = key_of(row, on_conflict).and_then(|key| {
                existing
                    .iter()
                    .position(|r| key_of(r, on_conflict).as_ref() == Some(&key))
            });
            match position {
                Some(index) => {
                    for (column, value) in row {
                        existing[index].insert(column.clone(), value.clone());
                    }
                }
                None => existing.push(row.clone()),
            }
        }
        Ok(())
    }
}

fn key_of(row: &Row, column: &str) -> Option<String> {
    match row.get(column) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn execute(&self, operation: &Operation) -> Result<(), StoreError> {
        match operation {
            Operation::Insert { table, rows } => self.insert(table, rows),
            Operation::Upsert {
                table,
                rows,
                on_conflict,
            } => self.upsert(table, rows, on_conflict),
            Operation::Delete { table, filter } => {
                if let Some(existing) = self.lock().get_mut(table) {
                    existing.retain(|row| !filter.matches(row));
                }
                Ok(())
            }
        }
    }

    async fn ping(&self, _table: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory (dry run)".to_string()
    }
}
