//! Configuration for sheetload
//!
//! Resolved once at startup from, in increasing precedence: built-in
//! defaults, a TOML file, environment variables, command-line flags. The
//! result is passed down explicitly; nothing reads configuration globally.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{ResilienceConfig, RetryConfig};
use crate::ingest::DEFAULT_BATCH_SIZE;
use crate::upload::UploadMode;

pub const ENV_URL: &str = "SHEETLOAD_URL";
pub const ENV_KEY: &str = "SHEETLOAD_KEY";
pub const ENV_TABLE: &str = "SHEETLOAD_TABLE";

const DEFAULT_TABLE: &str = "coatings";
const DEFAULT_KEY_COLUMN: &str = "sku";
const DEFAULT_BATCH_DELAY_MS: u64 = 100;
const DEFAULT_FAILURES_FILE: &str = "failed_rows.json";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Remote store endpoint and credential
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub url: Option<String>,
    pub key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
}

/// Upload behaviour
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadSection {
    pub table: Option<String>,
    pub key_column: Option<String>,
    pub batch_size: Option<usize>,
    pub mode: Option<UploadMode>,
    pub batch_delay_ms: Option<u64>,
    pub failures_file: Option<PathBuf>,
    pub sheet: Option<String>,
}

/// On-disk configuration file layout
///
/// ```toml
/// [store]
/// url = "https://project.supabase.co"
/// key = "service-role-key"
///
/// [upload]
/// table = "coatings"
/// batch_size = 500
/// mode = "upsert"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub store: StoreSection,
    pub upload: UploadSection,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid configuration file")
    }
}

/// Values supplied on the command line; `None` leaves lower layers in place
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub table: Option<String>,
    pub key_column: Option<String>,
    pub batch_size: Option<usize>,
    pub mode: Option<UploadMode>,
    pub sheet: Option<String>,
    pub failures_file: Option<PathBuf>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
    pub key_column: String,
    pub batch_size: usize,
    pub mode: UploadMode,
    pub batch_delay: Duration,
    pub failures_file: PathBuf,
    pub sheet: Option<String>,
    pub resilience: ResilienceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: DEFAULT_TABLE.to_string(),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            mode: UploadMode::default(),
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            failures_file: PathBuf::from(DEFAULT_FAILURES_FILE),
            sheet: None,
            resilience: ResilienceConfig::builder()
                .request_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build(),
        }
    }
}

impl Config {
    /// Default location of the config file (`~/.config/sheetload/config.toml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sheetload").join("config.toml"))
    }

    /// Resolve configuration from every layer.
    ///
    /// An explicit `path` must exist; the default path is used only when present.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let file = match path {
            Some(path) => Some(read_file(path)?),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default) => Some(read_file(&default)?),
                None => None,
            },
        };

        let mut config = Config::default();
        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env(|name| std::env::var(name).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        let FileConfig { store, upload } = file;

        if store.url.is_some() {
            self.url = store.url;
        }
        if store.key.is_some() {
            self.api_key = store.key;
        }
        let mut resilience = ResilienceConfig::builder()
            .retry_config(RetryConfig {
                base_delay: store
                    .retry_base_delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(self.resilience.retry.base_delay),
                ..self.resilience.retry.clone()
            })
            .request_timeout(
                store
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(self.resilience.request_timeout),
            );
        if let Some(attempts) = store.max_attempts {
            resilience = resilience.max_attempts(attempts);
        }
        self.resilience = resilience.build();

        if let Some(table) = upload.table {
            self.table = table;
        }
        if let Some(key_column) = upload.key_column {
            self.key_column = key_column;
        }
        if let Some(batch_size) = upload.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(mode) = upload.mode {
            self.mode = mode;
        }
        if let Some(ms) = upload.batch_delay_ms {
            self.batch_delay = Duration::from_millis(ms);
        }
        if let Some(failures_file) = upload.failures_file {
            self.failures_file = failures_file;
        }
        if upload.sheet.is_some() {
            self.sheet = upload.sheet;
        }
    }

    /// Apply environment variables through `lookup` (`std::env::var` in production)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_URL) {
            self.url = Some(url);
        }
        if let Some(key) = non_empty(ENV_KEY) {
            self.api_key = Some(key);
        }
        if let Some(table) = non_empty(ENV_TABLE) {
            self.table = table;
        }
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(table) = overrides.table {
            self.table = table;
        }
        if let Some(key_column) = overrides.key_column {
            self.key_column = key_column;
        }
        if let Some(batch_size) = overrides.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if overrides.sheet.is_some() {
            self.sheet = overrides.sheet;
        }
        if let Some(failures_file) = overrides.failures_file {
            self.failures_file = failures_file;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("Batch size must be a positive integer");
        }
        if self.table.trim().is_empty() {
            anyhow::bail!("Table name must not be empty");
        }
        if self.key_column.trim().is_empty() {
            anyhow::bail!("Key column must not be empty");
        }
        Ok(())
    }

    /// Endpoint and credential, required by commands that touch the store
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let url = self.url.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No store URL configured. Set {} or [store].url in the config file",
                ENV_URL
            )
        })?;
        let key = self.api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured. Set {} or [store].key in the config file",
                ENV_KEY
            )
        })?;
        Ok((url, key))
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    FileConfig::parse(&text).with_context(|| format!("In config file {}", path.display()))
}
