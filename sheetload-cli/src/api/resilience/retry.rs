//! Bounded exponential backoff for store requests
//!
//! Off by default (`max_attempts = 1`). When raised, only errors the store
//! could plausibly recover from are retried, see [`StoreError::is_retryable`].

use log::warn;
use std::future::Future;
use std::time::Duration;

use crate::api::StoreError;

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one; 1 disables retries
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A config with retries switched off
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay before retry number `retry` (1-based), capped at `max_delay`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .max(1.0)
            .powi(retry.saturating_sub(1) as i32);
        let millis = self.base_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Executes store requests under a [`RetryConfig`]
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `attempt` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent
    pub async fn execute<F, Fut, T>(&self, description: &str, mut attempt: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut tries = 0;

        loop {
            tries += 1;
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && tries < max_attempts => {
                    let delay = self.config.delay_for(tries);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        description, tries, max_attempts, delay, err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> StoreError {
        StoreError::Api {
            status: 503,
            code: None,
            message: "unavailable".to_string(),
            details: None,
        }
    }

    #[test]
    fn test_default_disables_retries() {
        assert_eq!(RetryConfig::default().max_attempts, 1);
    }

    #[test]
    fn test_delay_growth_and_cap() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            backoff_multiplier: 2.0,
        };
        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 3,
            ..RetryConfig::none()
        });
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = policy
            .execute("insert", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_constraint_errors_not_retried() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 5,
            ..RetryConfig::none()
        });
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), StoreError> = policy
            .execute("insert", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::from_response(
                    409,
                    r#"{"code":"23505","message":"duplicate key"}"#,
                ))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 2,
            ..RetryConfig::none()
        });
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), StoreError> = policy
            .execute("insert", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            })
            .await;

        assert_eq!(result, Err(server_error()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
