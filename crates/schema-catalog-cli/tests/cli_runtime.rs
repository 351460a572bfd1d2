// crates/schema-catalog-cli/tests/cli_runtime.rs
// ============================================================================
// Module: CLI Runtime Tests
// Description: Component wiring, scheduled runs, and catalog reports.
// Purpose: Exercise what the binary runs without spawning a process.
// ============================================================================

//! ## Overview
//! Drives bootstrap, the periodic scheduler, and catalog reports against an
//! in-process registry under paused tokio time.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use schema_catalog_cli::bootstrap::build_store;
use schema_catalog_cli::build_components;
use schema_catalog_cli::run_periodic;
use schema_catalog_cli::subject_report;
use schema_catalog_config::SchemaCatalogConfig;
use schema_catalog_core::InMemoryCatalogStore;
use schema_catalog_core::RegisteredSchema;
use schema_catalog_core::RegistryError;
use schema_catalog_core::SchemaBody;
use schema_catalog_core::SchemaRegistryClient;
use schema_catalog_core::SchemaType;
use schema_catalog_core::SubjectConfig;
use schema_catalog_core::SubjectMode;
use schema_catalog_core::SyncConfig;
use schema_catalog_core::SyncOrchestrator;
use tempfile::TempDir;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Registry with one subject at version 2 that counts listing calls.
#[derive(Default)]
struct SingleSubjectRegistry {
    listings: AtomicU64,
}

#[async_trait]
impl SchemaRegistryClient for SingleSubjectRegistry {
    async fn list_subjects(&self) -> Result<Vec<String>, RegistryError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["dev.users-value".to_string()])
    }

    async fn get_latest_version(&self, subject: &str) -> Result<RegisteredSchema, RegistryError> {
        self.get_version(subject, 2).await
    }

    async fn get_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<RegisteredSchema, RegistryError> {
        Ok(RegisteredSchema {
            subject: subject.to_string(),
            version,
            schema: SchemaBody {
                schema_str: Some(format!(r#"{{"type":"record","name":"User{version}","fields":[]}}"#)),
                schema_type: SchemaType::Avro,
                schema_id: None,
            },
            references: None,
            rule_set: None,
            metadata: None,
        })
    }

    async fn get_config(&self, _subject: &str) -> Result<Option<SubjectConfig>, RegistryError> {
        Ok(None)
    }

    async fn get_mode(&self, _subject: &str) -> Result<SubjectMode, RegistryError> {
        Err(RegistryError::Unsupported("no mode endpoint".to_string()))
    }
}

fn sqlite_config(dir: &TempDir) -> SchemaCatalogConfig {
    let path = dir.path().join("nested").join("catalog.db");
    SchemaCatalogConfig::from_toml_str(&format!(
        "[registry]\nurl = \"http://127.0.0.1:1\"\n\n[store]\ntype = \"sqlite\"\npath = {:?}\n",
        path.to_string_lossy()
    ))
    .unwrap()
}

// ============================================================================
// SECTION: Bootstrap
// ============================================================================

#[test]
fn sqlite_store_is_opened_from_config() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);
    let store = build_store(&config.store).unwrap();
    assert!(store.list_subject_entries().unwrap().is_empty());
    assert!(dir.path().join("nested").join("catalog.db").exists());
}

#[test]
fn components_build_with_memory_store_by_default() {
    let config =
        SchemaCatalogConfig::from_toml_str("[registry]\nurl = \"http://127.0.0.1:1\"\n").unwrap();
    let components = build_components(&config).unwrap();
    assert!(components.store.known_subjects().unwrap().is_empty());
}

// ============================================================================
// SECTION: Scheduler
// ============================================================================

#[tokio::test(start_paused = true)]
async fn scheduler_runs_immediately_then_on_interval_until_shutdown() {
    let registry = Arc::new(SingleSubjectRegistry::default());
    let store = Arc::new(InMemoryCatalogStore::new());
    let orchestrator = SyncOrchestrator::new(registry.clone(), store.clone(), SyncConfig::default());

    let runs = run_periodic(
        &orchestrator,
        Duration::from_secs(60),
        tokio::time::sleep(Duration::from_secs(125)),
    )
    .await;

    assert_eq!(runs, 3);
    assert_eq!(registry.listings.load(Ordering::SeqCst), 3);
    let report = subject_report(store.as_ref(), "dev.users-value").unwrap().unwrap();
    assert_eq!(report.versions, vec![1, 2]);
    assert_eq!(report.entry.environment.as_deref(), Some("dev"));
}

#[tokio::test(start_paused = true)]
async fn scheduler_stops_before_first_run_when_already_shut_down() {
    let registry = Arc::new(SingleSubjectRegistry::default());
    let orchestrator = SyncOrchestrator::new(
        registry.clone(),
        Arc::new(InMemoryCatalogStore::new()),
        SyncConfig::default(),
    );
    let runs = run_periodic(&orchestrator, Duration::from_secs(60), std::future::ready(())).await;
    assert_eq!(runs, 0);
    assert_eq!(registry.listings.load(Ordering::SeqCst), 0);
}

// ============================================================================
// SECTION: Reports
// ============================================================================

#[test]
fn unknown_subject_has_no_report() {
    let store = InMemoryCatalogStore::new();
    assert!(subject_report(&store, "missing-value").unwrap().is_none());
}
