//! REST client for PostgREST-compatible table stores (Supabase and friends)
//!
//! Endpoints:
//! - `POST   {base}/rest/v1/{table}`                     insert
//! - `POST   {base}/rest/v1/{table}?on_conflict={col}`   upsert (merge-duplicates)
//! - `DELETE {base}/rest/v1/{table}?{col}=neq.{value}`   delete by filter
//! - `GET    {base}/rest/v1/{table}?select=*&limit=0`    reachability check

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Instant;

use super::operations::Operation;
use super::resilience::{ResilienceConfig, RetryPolicy};
use super::{StoreError, TableStore};

const REST_PATH: &str = "rest/v1";
const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_MERGE: &str = "resolution=merge-duplicates,return=minimal";

/// Table store reached over HTTP with a static API key
#[derive(Debug, Clone)]
pub struct RestTableStore {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RestTableStore {
    /// Create a client for `base_url` authenticating with `api_key`.
    ///
    /// The key is sent both as `apikey` and as a bearer token, which is what
    /// Supabase expects for service-role keys.
    pub fn new(base_url: &str, api_key: &str, resilience: ResilienceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key).context("API key contains invalid header characters")?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("API key contains invalid header characters")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(resilience.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(resilience.retry),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, table)
    }

    fn build_request(&self, operation: &Operation) -> reqwest::RequestBuilder {
        let url = self.table_url(operation.table());
        match operation {
            Operation::Insert { rows, .. } => self
                .http
                .post(url)
                .header("Prefer", PREFER_MINIMAL)
                .json(rows),
            Operation::Upsert {
                rows, on_conflict, ..
            } => self
                .http
                .post(url)
                .query(&[("on_conflict", on_conflict.as_str())])
                .header("Prefer", PREFER_MERGE)
                .json(rows),
            Operation::Delete { filter, .. } => {
                let (column, condition) = filter.to_query_pair();
                self.http
                    .delete(url)
                    .query(&[(column.as_str(), condition.as_str())])
                    .header("Prefer", PREFER_MINIMAL)
            }
        }
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<(), StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::from_response(status.as_u16(), &body))
    }
}

#[async_trait]
impl TableStore for RestTableStore {
    async fn execute(&self, operation: &Operation) -> Result<(), StoreError> {
        let started = Instant::now();
        let description = format!(
            "{} {} ({} rows)",
            operation.operation_type(),
            operation.table(),
            operation.row_count()
        );

        let result = self
            .retry
            .execute(&description, || Self::send(self.build_request(operation)))
            .await;

        debug!(
            "{} {} -> {} in {:.2}ms",
            operation.http_method(),
            description,
            if result.is_ok() { "ok" } else { "error" },
            started.elapsed().as_secs_f64() * 1000.0
        );

        result
    }

    async fn ping(&self, table: &str) -> Result<(), StoreError> {
        self.retry
            .execute("connection check", || {
                Self::send(
                    self.http
                        .get(self.table_url(table))
                        .query(&[("select", "*"), ("limit", "0")]),
                )
            })
            .await
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
