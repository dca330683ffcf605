//! The table store seam
//!
//! Upload and clear logic only talk to a [`TableStore`]; the REST client and
//! the in-memory store (dry runs, tests) both implement it.

use async_trait::async_trait;

use super::StoreError;
use super::operations::Operation;

#[async_trait]
pub trait TableStore: Send + Sync {
    /// Execute one request; a single round trip from the caller's point of view
    async fn execute(&self, operation: &Operation) -> Result<(), StoreError>;

    /// Cheap request proving the store is reachable and the table exists
    async fn ping(&self, table: &str) -> Result<(), StoreError>;

    /// Short description for log lines ("https://x.supabase.co", "in-memory")
    fn describe(&self) -> String;
}
