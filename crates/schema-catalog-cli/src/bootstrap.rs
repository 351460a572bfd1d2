// crates/schema-catalog-cli/src/bootstrap.rs
// ============================================================================
// Module: CLI Bootstrap
// Description: Builds the registry client, catalog store, and orchestrator.
// Purpose: Turn a validated config into runnable sync components.
// Dependencies: schema-catalog-config, schema-catalog-registry, tracing-subscriber
// ============================================================================

//! ## Overview
//! Bootstrap is the only place that knows which concrete backends exist. The
//! rest of the binary works against `Arc<dyn CatalogStore>` and a ready
//! [`SyncOrchestrator`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use schema_catalog_config::LoggingSection;
use schema_catalog_config::RegistrySection;
use schema_catalog_config::SchemaCatalogConfig;
use schema_catalog_config::StoreSection;
use schema_catalog_core::CatalogStore;
use schema_catalog_core::InMemoryCatalogStore;
use schema_catalog_core::SchemaRegistryClient;
use schema_catalog_core::SyncOrchestrator;
use schema_catalog_registry::HttpRegistryClient;
use schema_catalog_store_sqlite::SqliteCatalogStore;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while assembling runtime components.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Registry client could not be constructed.
    #[error("registry client init failed: {0}")]
    Registry(String),
    /// Catalog store could not be opened.
    #[error("catalog store init failed: {0}")]
    Store(String),
    /// Log subscriber could not be installed.
    #[error("logging init failed: {0}")]
    Logging(String),
}

// ============================================================================
// SECTION: Components
// ============================================================================

/// Runtime components built from config.
pub struct SyncComponents {
    /// Orchestrator wired to the configured registry and store.
    pub orchestrator: SyncOrchestrator,
    /// Store shared with the orchestrator.
    pub store: Arc<dyn CatalogStore>,
}

/// Builds the registry client from the registry section.
///
/// # Errors
///
/// Returns [`BootstrapError::Registry`] when the client config is rejected.
pub fn build_client(
    section: &RegistrySection,
) -> Result<Arc<dyn SchemaRegistryClient>, BootstrapError> {
    let client = HttpRegistryClient::new(section.client_config())
        .map_err(|err| BootstrapError::Registry(err.to_string()))?;
    Ok(Arc::new(client))
}

/// Opens the configured catalog store.
///
/// # Errors
///
/// Returns [`BootstrapError::Store`] when the `SQLite` store cannot be opened.
pub fn build_store(section: &StoreSection) -> Result<Arc<dyn CatalogStore>, BootstrapError> {
    match section.sqlite_config() {
        Some(config) => {
            let store = SqliteCatalogStore::open(config)
                .map_err(|err| BootstrapError::Store(err.to_string()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryCatalogStore::new())),
    }
}

/// Builds the orchestrator and its store from a full config.
///
/// # Errors
///
/// Returns [`BootstrapError`] when the client or store cannot be built.
pub fn build_components(config: &SchemaCatalogConfig) -> Result<SyncComponents, BootstrapError> {
    let client = build_client(&config.registry)?;
    let store = build_store(&config.store)?;
    let orchestrator =
        SyncOrchestrator::new(client, Arc::clone(&store), config.sync.sync_config());
    Ok(SyncComponents {
        orchestrator,
        store,
    })
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Resolves the log filter, preferring `RUST_LOG` over config.
///
/// # Errors
///
/// Returns [`BootstrapError::Logging`] when the configured directive is invalid.
pub fn log_filter(section: &LoggingSection) -> Result<EnvFilter, BootstrapError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(section.filter.trim())
        .map_err(|err| BootstrapError::Logging(format!("invalid logging.filter: {err}")))
}

/// Installs the global `tracing` subscriber writing to stderr.
///
/// # Errors
///
/// Returns [`BootstrapError::Logging`] when the filter is invalid or a
/// subscriber is already installed.
pub fn init_logging(section: &LoggingSection) -> Result<(), BootstrapError> {
    let filter = log_filter(section)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(section.ansi)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| BootstrapError::Logging(err.to_string()))
}
