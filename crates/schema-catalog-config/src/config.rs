// crates/schema-catalog-config/src/config.rs
// ============================================================================
// Module: Schema Catalog Configuration
// Description: Configuration loading and validation for catalog sync.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: schema-catalog-core, schema-catalog-registry, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `SCHEMA_CATALOG_CONFIG`, then
//! `schema-catalog.toml` in the working directory. Every numeric knob is
//! range-checked so a bad file fails at startup rather than mid-run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use schema_catalog_core::GatewayConfig;
use schema_catalog_core::SyncConfig;
use schema_catalog_registry::DEFAULT_MAX_RESPONSE_BYTES;
use schema_catalog_registry::DEFAULT_USER_AGENT;
use schema_catalog_registry::HttpRegistryConfig;
use schema_catalog_store_sqlite::DEFAULT_BUSY_TIMEOUT_MS;
use schema_catalog_store_sqlite::SqliteStoreConfig;
use schema_catalog_store_sqlite::SqliteStoreMode;
use schema_catalog_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "schema-catalog.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SCHEMA_CATALOG_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for `sync.max_concurrent`.
const MAX_CONCURRENT_LIMIT: usize = 256;
/// Allowed range for `sync.request_timeout_ms`.
const REQUEST_TIMEOUT_RANGE_MS: (u64, u64) = (100, 120_000);
/// Allowed range for `sync.max_retries`.
const MAX_RETRIES_RANGE: (u32, u32) = (1, 10);
/// Allowed range for `sync.retry_base_delay_ms`.
const RETRY_BASE_DELAY_RANGE_MS: (u64, u64) = (1, 60_000);
/// Upper bound for `registry.max_response_bytes`.
const MAX_RESPONSE_BYTES_LIMIT: usize = 256 * 1024 * 1024;
/// Maximum length of the registry user agent.
const MAX_USER_AGENT_LENGTH: usize = 256;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for the catalog sync binary.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaCatalogConfig {
    /// Upstream registry connection settings.
    pub registry: RegistrySection,
    /// Sync engine tuning.
    #[serde(default)]
    pub sync: SyncSection,
    /// Catalog store backend.
    #[serde(default)]
    pub store: StoreSection,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl SchemaCatalogConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| {
            ConfigError::Io(format!("failed to read {}: {err}", resolved.display()))
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry.validate()?;
        self.sync.validate()?;
        self.store.validate()?;
        self.logging.validate()
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry connection configuration.
#[derive(Clone, Deserialize)]
pub struct RegistrySection {
    /// Registry base URL (`http://` or `https://`).
    pub url: String,
    /// Basic auth username.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic auth password.
    #[serde(default)]
    pub password: Option<String>,
    /// User agent sent with registry requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum registry response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl std::fmt::Debug for RegistrySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySection")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

impl RegistrySection {
    /// Validates registry settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("registry.url must be set".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "registry.url must include http:// or https://".to_string(),
            ));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(ConfigError::Invalid(
                "registry.username and registry.password must be set together".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() || self.user_agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid("registry.user_agent out of range".to_string()));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(
                "registry.max_response_bytes out of range".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the HTTP registry client configuration.
    #[must_use]
    pub fn client_config(&self) -> HttpRegistryConfig {
        HttpRegistryConfig {
            base_url: self.url.trim().to_string(),
            username: self.username.clone(),
            password: self.password.clone(),
            user_agent: self.user_agent.clone(),
            max_response_bytes: self.max_response_bytes,
        }
    }
}

// ============================================================================
// SECTION: Sync
// ============================================================================

/// Sync engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    /// Maximum subject workers in flight.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Per-call registry deadline in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Attempts for the latest-version lookup.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Seconds between runs in `serve` mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl SyncSection {
    /// Validates sync tuning ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 || self.max_concurrent > MAX_CONCURRENT_LIMIT {
            return Err(ConfigError::Invalid("sync.max_concurrent out of range".to_string()));
        }
        if !in_range(self.request_timeout_ms, REQUEST_TIMEOUT_RANGE_MS) {
            return Err(ConfigError::Invalid("sync.request_timeout_ms out of range".to_string()));
        }
        if !in_range(self.max_retries, MAX_RETRIES_RANGE) {
            return Err(ConfigError::Invalid("sync.max_retries out of range".to_string()));
        }
        if !in_range(self.retry_base_delay_ms, RETRY_BASE_DELAY_RANGE_MS) {
            return Err(ConfigError::Invalid("sync.retry_base_delay_ms out of range".to_string()));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the orchestrator configuration.
    #[must_use]
    pub const fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            max_concurrent: self.max_concurrent,
            gateway: GatewayConfig {
                request_timeout: Duration::from_millis(self.request_timeout_ms),
                max_retries: self.max_retries,
                retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
            },
        }
    }

    /// Returns the delay between `serve` runs.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Catalog store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local in-memory store.
    #[default]
    Memory,
    /// `SQLite`-backed durable store.
    Sqlite,
}

/// Catalog store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreSection {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_store_path(path)
            }
        }
    }

    /// Builds the `SQLite` store configuration, or `None` for the memory
    /// backend.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match self.store_type {
            StoreType::Memory => None,
            StoreType::Sqlite => self.path.as_ref().map(|path| SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
        }
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Log output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit ANSI colour codes.
    #[serde(default = "default_log_ansi")]
    pub ansi: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            ansi: default_log_ansi(),
        }
    }
}

impl LoggingSection {
    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    check_path_lengths(path, "config path")
}

/// Validates the store path against length limits.
fn validate_store_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("store.path must be non-empty".to_string()));
    }
    check_path_lengths(path, "store.path")
}

/// Enforces total and per-component length limits for `field`.
fn check_path_lengths(path: &Path, field: &str) -> Result<(), ConfigError> {
    if path.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}

/// Returns true when `value` lies within the inclusive `range`.
fn in_range<T: PartialOrd>(value: T, range: (T, T)) -> bool {
    value >= range.0 && value <= range.1
}

/// Default registry user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Default registry response limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default worker concurrency.
const fn default_max_concurrent() -> usize {
    schema_catalog_core::runtime::DEFAULT_MAX_CONCURRENT
}

/// Default per-call deadline.
const fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Default latest-version attempts.
const fn default_max_retries() -> u32 {
    3
}

/// Default backoff base.
const fn default_retry_base_delay_ms() -> u64 {
    500
}

/// Default `serve` interval.
const fn default_interval_secs() -> u64 {
    300
}

/// Default `SQLite` busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default log filter.
fn default_log_filter() -> String {
    "info".to_string()
}

/// Default ANSI setting.
const fn default_log_ansi() -> bool {
    true
}
