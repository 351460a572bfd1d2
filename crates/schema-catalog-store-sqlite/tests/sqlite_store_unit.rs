// crates/schema-catalog-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Catalog Store Unit Tests
// Description: Persistence contract tests for the SQLite catalog store.
// Purpose: Validate path safety, schema versioning, immutable snapshots,
//          high-water-mark ratcheting, and transactional cascades.
// ============================================================================

//! ## Overview
//! Unit-level tests for `SQLite` catalog store invariants:
//! - Path safety checks (directory and overlong component rejection)
//! - Schema version validation on reopen
//! - Insert-if-absent snapshots and monotonic `latest_version`
//! - Partial subject metadata updates
//! - Stale subject cascades with accurate row counts
//! - Concurrent writers through shared handles

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use rusqlite::Connection;
use rusqlite::params;
use schema_catalog_core::ArtifactRecord;
use schema_catalog_core::CatalogStore;
use schema_catalog_core::FieldMeta;
use schema_catalog_core::FieldsMeta;
use schema_catalog_core::MetadataRecord;
use schema_catalog_core::SchemaReference;
use schema_catalog_core::SchemaType;
use schema_catalog_core::SchemaVersionSnapshot;
use schema_catalog_core::StoreError;
use schema_catalog_core::SubjectMetaUpdate;
use schema_catalog_core::UpsertOutcome;
use schema_catalog_core::canonicalize_and_hash;
use schema_catalog_store_sqlite::SqliteCatalogStore;
use schema_catalog_store_sqlite::SqliteStoreConfig;
use schema_catalog_store_sqlite::SqliteStoreError;
use schema_catalog_store_sqlite::SqliteStoreMode;
use schema_catalog_store_sqlite::SqliteSyncMode;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn open_store(path: &Path) -> SqliteCatalogStore {
    SqliteCatalogStore::open(SqliteStoreConfig::new(path)).unwrap()
}

fn snapshot(subject: &str, version: u32) -> SchemaVersionSnapshot {
    let body = format!(r#"{{"type":"record","name":"V{version}","fields":[]}}"#);
    SchemaVersionSnapshot {
        subject: subject.to_string(),
        version,
        schema_type: SchemaType::Avro,
        registry_id: Some(i64::from(version)),
        canonical_hash: canonicalize_and_hash(&body),
        schema_body: body,
        references: None,
        rule_set: None,
        registry_metadata: None,
        fields_meta: None,
        lint_report: None,
    }
}

fn subjects(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

// ============================================================================
// SECTION: Open and Schema
// ============================================================================

#[test]
fn open_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("catalog.db");
    let store = open_store(&path);
    store.check_connection().unwrap();
    assert!(path.exists());
    assert_eq!(store.config().path, path);
}

#[test]
fn directory_path_is_rejected() {
    let dir = TempDir::new().unwrap();
    let Err(err) = SqliteCatalogStore::open(SqliteStoreConfig::new(dir.path())) else {
        panic!("directory path accepted");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn overlong_path_component_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a".repeat(300));
    let Err(err) = SqliteCatalogStore::open(SqliteStoreConfig::new(path)) else {
        panic!("overlong component accepted");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn unsupported_schema_version_fails_closed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.db");
    drop(open_store(&path));
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = ?1", params![99]).unwrap();
    drop(connection);

    let Err(err) = SqliteCatalogStore::open(SqliteStoreConfig::new(&path)) else {
        panic!("unsupported version accepted");
    };
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)));
}

#[test]
fn delete_journal_and_normal_sync_are_accepted() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        path: dir.path().join("catalog.db"),
        busy_timeout_ms: 100,
        journal_mode: SqliteStoreMode::Delete,
        sync_mode: SqliteSyncMode::Normal,
    };
    let store = SqliteCatalogStore::open(config).unwrap();
    assert_eq!(store.upsert_version(&snapshot("orders-value", 1)).unwrap(), UpsertOutcome::Inserted);
}

// ============================================================================
// SECTION: Versions
// ============================================================================

#[test]
fn snapshots_are_insert_if_absent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));

    let original = snapshot("orders-value", 1);
    assert_eq!(store.upsert_version(&original).unwrap(), UpsertOutcome::Inserted);

    let mut rewritten = original.clone();
    rewritten.schema_body = "\"string\"".to_string();
    assert_eq!(store.upsert_version(&rewritten).unwrap(), UpsertOutcome::AlreadyPresent);

    let stored = store.version_snapshot("orders-value", 1).unwrap().unwrap();
    assert_eq!(stored, original);
}

#[test]
fn latest_version_only_moves_upward() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));

    assert_eq!(store.latest_version("orders-value").unwrap(), None);
    store.upsert_version(&snapshot("orders-value", 3)).unwrap();
    store.upsert_version(&snapshot("orders-value", 2)).unwrap();
    assert_eq!(store.latest_version("orders-value").unwrap(), Some(3));
    store.upsert_version(&snapshot("orders-value", 5)).unwrap();
    assert_eq!(store.latest_version("orders-value").unwrap(), Some(5));
    assert_eq!(store.list_versions("orders-value").unwrap(), vec![2, 3, 5]);
}

#[test]
fn json_columns_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.db");
    let mut enriched = snapshot("customers-value", 1);
    enriched.references = Some(vec![SchemaReference {
        name: "Address".to_string(),
        subject: "address-value".to_string(),
        version: 2,
    }]);
    enriched.rule_set = Some(json!({"domainRules": []}));
    enriched.registry_metadata = Some(json!({"properties": {"owner": "payments"}}));
    enriched.fields_meta = Some(FieldsMeta {
        fields: vec![FieldMeta {
            name: "email".to_string(),
            field_type: json!(["null", "string"]),
            pii_candidate: true,
        }],
    });
    open_store(&path).upsert_version(&enriched).unwrap();

    let reopened = open_store(&path);
    assert_eq!(reopened.version_snapshot("customers-value", 1).unwrap().unwrap(), enriched);
    assert!(reopened.version_snapshot("customers-value", 2).unwrap().is_none());
}

#[test]
fn corrupt_schema_type_is_reported_as_invalid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.db");
    let store = open_store(&path);
    store.upsert_version(&snapshot("orders-value", 1)).unwrap();
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE schema_versions SET schema_type = 'THRIFT'", []).unwrap();
    drop(connection);

    let err = store.version_snapshot("orders-value", 1).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

// ============================================================================
// SECTION: Subject Metadata
// ============================================================================

#[test]
fn meta_update_leaves_absent_fields_untouched() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));
    store.upsert_version(&snapshot("dev.orders-value", 1)).unwrap();

    let first = SubjectMetaUpdate {
        compatibility_level: Some("BACKWARD".to_string()),
        mode_read_only: Some(true),
        environment: Some("dev".to_string()),
    };
    assert!(store.update_subject_meta("dev.orders-value", &first).unwrap());
    assert!(store.update_subject_meta("dev.orders-value", &SubjectMetaUpdate::default()).unwrap());

    let entry = store.subject_entry("dev.orders-value").unwrap().unwrap();
    assert_eq!(entry.latest_version, Some(1));
    assert_eq!(entry.compatibility_level.as_deref(), Some("BACKWARD"));
    assert!(entry.mode_read_only);
    assert_eq!(entry.environment.as_deref(), Some("dev"));
    assert!(entry.owner_team.is_none());
    assert!(entry.pii_score.abs() < f64::EPSILON);
}

#[test]
fn meta_update_for_unknown_subject_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));
    let update = SubjectMetaUpdate {
        compatibility_level: Some("FULL".to_string()),
        ..SubjectMetaUpdate::default()
    };
    assert!(!store.update_subject_meta("ghost-value", &update).unwrap());
    assert!(store.list_subject_entries().unwrap().is_empty());
}

#[test]
fn metadata_records_replace_by_key() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));
    for value in ["a", "b"] {
        store
            .record_metadata(&MetadataRecord {
                subject: "orders-value".to_string(),
                key: "owner".to_string(),
                value: json!(value),
            })
            .unwrap();
    }
    let counts = store.count_rows(&subjects(&["orders-value"])).unwrap();
    assert_eq!(counts.metadata, 1);
    assert_eq!(counts.subjects, 0);
}

// ============================================================================
// SECTION: Removal
// ============================================================================

#[test]
fn remove_subjects_cascades_and_counts_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));
    for version in 1..=3 {
        store.upsert_version(&snapshot("legacy-value", version)).unwrap();
    }
    store.upsert_version(&snapshot("orders-value", 1)).unwrap();
    store
        .record_artifact(&ArtifactRecord {
            subject: "legacy-value".to_string(),
            version: Some(2),
            kind: "lint".to_string(),
            payload: json!({"warnings": 1}),
        })
        .unwrap();
    store
        .record_metadata(&MetadataRecord {
            subject: "legacy-value".to_string(),
            key: "tier".to_string(),
            value: json!("gold"),
        })
        .unwrap();

    let stale = subjects(&["legacy-value"]);
    let preview = store.count_rows(&stale).unwrap();
    let removed = store.remove_subjects(&stale).unwrap();

    assert_eq!(preview, removed);
    assert_eq!(removed.subjects, 1);
    assert_eq!(removed.versions, 3);
    assert_eq!(removed.artifacts, 1);
    assert_eq!(removed.metadata, 1);
    assert_eq!(store.known_subjects().unwrap(), subjects(&["orders-value"]));
    assert!(store.list_versions("legacy-value").unwrap().is_empty());
    assert_eq!(store.latest_version("orders-value").unwrap(), Some(1));
}

#[test]
fn orphan_rows_are_known_and_removable() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));
    store
        .record_artifact(&ArtifactRecord {
            subject: "orphan-value".to_string(),
            version: None,
            kind: "note".to_string(),
            payload: json!("left behind"),
        })
        .unwrap();

    assert!(store.known_subjects().unwrap().contains("orphan-value"));
    let removed = store.remove_subjects(&subjects(&["orphan-value"])).unwrap();
    assert_eq!(removed.subjects, 0);
    assert_eq!(removed.artifacts, 1);
    assert!(store.known_subjects().unwrap().is_empty());
}

#[test]
fn large_removal_sets_are_chunked() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));
    let mut stale = BTreeSet::new();
    for index in 0..1_200 {
        let subject = format!("subject-{index:04}-value");
        store.upsert_version(&snapshot(&subject, 1)).unwrap();
        stale.insert(subject);
    }
    let removed = store.remove_subjects(&stale).unwrap();
    assert_eq!(removed.subjects, 1_200);
    assert_eq!(removed.versions, 1_200);
    assert!(store.list_subject_entries().unwrap().is_empty());
}

#[test]
fn empty_removal_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("catalog.db"));
    store.upsert_version(&snapshot("orders-value", 1)).unwrap();
    let removed = store.remove_subjects(&BTreeSet::new()).unwrap();
    assert_eq!(removed.subjects, 0);
    assert_eq!(store.list_subject_entries().unwrap().len(), 1);
}

// ============================================================================
// SECTION: Concurrency
// ============================================================================

#[test]
fn concurrent_writers_share_one_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir.path().join("catalog.db")));
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let subject = format!("subject-{worker}-value");
                for version in 1..=5 {
                    store.upsert_version(&snapshot(&subject, version)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let entries = store.list_subject_entries().unwrap();
    assert_eq!(entries.len(), 8);
    assert!(entries.iter().all(|entry| entry.latest_version == Some(5)));
}
