//! Table store API
//!
//! Request model ([`Operation`]), the [`TableStore`] seam, and its two
//! implementations: a PostgREST client and an in-memory store.

pub mod client;
pub mod error;
pub mod memory;
pub mod operations;
pub mod query;
pub mod resilience;
pub mod store;

pub use client::RestTableStore;
pub use error::StoreError;
pub use memory::MemoryTableStore;
pub use operations::{Operation, Row, WriteMode};
pub use query::Filter;
pub use resilience::{ResilienceConfig, RetryConfig};
pub use store::TableStore;
