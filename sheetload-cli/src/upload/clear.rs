//! Destructive table wipe behind a typed confirmation

use log::{error, info, warn};

use crate::api::{Filter, Operation, TableStore};
use crate::prompt::Prompt;

/// The exact answer that authorizes deleting every row
pub const DELETE_CONFIRMATION: &str = "DELETE ALL";

/// Delete every row of `table` after the user types [`DELETE_CONFIRMATION`].
///
/// The store requires a filter on deletes, so "every row" is expressed as
/// `key_column != ''`; keys are never empty. Returns whether the table was
/// cleared. Declining, a prompt failure and a store error all return `false`
/// without touching the table.
pub async fn clear_table<S: TableStore + ?Sized>(
    store: &S,
    table: &str,
    key_column: &str,
    prompt: &dyn Prompt,
) -> bool {
    warn!("WARNING: This will delete ALL data from table '{}'", table);

    let answer = match prompt.confirm_phrase(&format!(
        "Are you sure you want to continue? Type '{}' to confirm",
        DELETE_CONFIRMATION
    )) {
        Ok(answer) => answer,
        Err(err) => {
            error!("Could not read confirmation: {:#}", err);
            return false;
        }
    };

    if answer != DELETE_CONFIRMATION {
        info!("Table clearing cancelled.");
        return false;
    }

    let filter = Filter::not_equal(key_column, "");
    info!("Deleting all records from '{}' where {}...", table, filter);
    let operation = Operation::delete(table, filter);
    match store.execute(&operation).await {
        Ok(()) => {
            info!("✓ Table cleared successfully");
            true
        }
        Err(err) => {
            error!("✗ Error clearing table: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryTableStore, StoreError};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    struct Answer(&'static str);

    impl Prompt for Answer {
        fn confirm_phrase(&self, _message: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn confirm_continue(&self, _message: &str) -> Result<bool> {
            Ok(true)
        }
    }

    struct BrokenTerminal;

    impl Prompt for BrokenTerminal {
        fn confirm_phrase(&self, _message: &str) -> Result<String> {
            anyhow::bail!("not a terminal")
        }

        fn confirm_continue(&self, _message: &str) -> Result<bool> {
            anyhow::bail!("not a terminal")
        }
    }

    async fn seeded_store() -> MemoryTableStore {
        let store = MemoryTableStore::new("sku");
        let rows = json!([{"sku": "A1"}, {"sku": "B2"}])
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        store
            .execute(&Operation::insert("coatings", rows))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_exact_phrase_clears() {
        let store = seeded_store().await;
        assert!(clear_table(&store, "coatings", "sku", &Answer("DELETE ALL")).await);
        assert!(store.rows("coatings").is_empty());
    }

    #[tokio::test]
    async fn test_wrong_case_is_declined() {
        let store = seeded_store().await;
        assert!(!clear_table(&store, "coatings", "sku", &Answer("delete all")).await);
        assert_eq!(store.rows("coatings").len(), 2);
    }

    #[tokio::test]
    async fn test_padded_phrase_is_declined() {
        let store = seeded_store().await;
        assert!(!clear_table(&store, "coatings", "sku", &Answer("DELETE ALL ")).await);
        assert_eq!(store.rows("coatings").len(), 2);
    }

    #[tokio::test]
    async fn test_prompt_failure_is_declined() {
        let store = seeded_store().await;
        assert!(!clear_table(&store, "coatings", "sku", &BrokenTerminal).await);
        assert_eq!(store.rows("coatings").len(), 2);
    }

    struct FailingStore;

    #[async_trait]
    impl TableStore for FailingStore {
        async fn execute(&self, _operation: &Operation) -> Result<(), StoreError> {
            Err(StoreError::Transport {
                message: "connection reset".to_string(),
            })
        }

        async fn ping(&self, _table: &str) -> Result<(), StoreError> {
            Ok(())
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[tokio::test]
    async fn test_store_error_reported_as_false() {
        assert!(!clear_table(&FailingStore, "coatings", "sku", &Answer("DELETE ALL")).await);
    }
}
