//! Request hardening for the table store client
//!
//! Provides timeout and retry settings plus the retry executor.

pub mod config;
pub mod retry;

pub use config::{ResilienceConfig, ResilienceConfigBuilder};
pub use retry::{RetryConfig, RetryPolicy};
