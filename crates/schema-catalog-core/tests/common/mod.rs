// crates/schema-catalog-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Scriptable fake registry and store wrappers for sync tests.
// Purpose: Provide deterministic collaborators for runtime tests.
// Dependencies: schema-catalog-core, tokio
// ============================================================================

//! ## Overview
//! Shared fixtures for the sync runtime tests: a scriptable in-process
//! registry that records every call and can hang, fail, or delay on demand,
//! and a store wrapper that rejects writes for chosen subjects.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Barrier;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use schema_catalog_core::ArtifactRecord;
use schema_catalog_core::CatalogStore;
use schema_catalog_core::InMemoryCatalogStore;
use schema_catalog_core::MetadataRecord;
use schema_catalog_core::RegisteredSchema;
use schema_catalog_core::RegistryError;
use schema_catalog_core::RemovalCounts;
use schema_catalog_core::SchemaBody;
use schema_catalog_core::SchemaRegistryClient;
use schema_catalog_core::SchemaType;
use schema_catalog_core::SchemaVersionSnapshot;
use schema_catalog_core::StoreError;
use schema_catalog_core::SubjectCatalogEntry;
use schema_catalog_core::SubjectConfig;
use schema_catalog_core::SubjectMetaUpdate;
use schema_catalog_core::SubjectMode;
use schema_catalog_core::UpsertOutcome;
use tokio::time::Instant;

// ============================================================================
// SECTION: Schema Builders
// ============================================================================

pub fn avro_body(record: &str, fields: &[&str]) -> String {
    let fields: Vec<serde_json::Value> = fields
        .iter()
        .map(|name| serde_json::json!({ "name": name, "type": "string" }))
        .collect();
    serde_json::json!({ "type": "record", "name": record, "fields": fields }).to_string()
}

pub fn registered(subject: &str, version: u32, body: &str) -> RegisteredSchema {
    RegisteredSchema {
        subject: subject.to_string(),
        version,
        schema: SchemaBody {
            schema_str: Some(body.to_string()),
            schema_type: SchemaType::Avro,
            schema_id: Some(i64::from(version) + 100),
        },
        references: None,
        rule_set: None,
        metadata: None,
    }
}

// ============================================================================
// SECTION: Fake Registry
// ============================================================================

#[derive(Default)]
struct FakeState {
    subjects: BTreeMap<String, BTreeMap<u32, RegisteredSchema>>,
    phantoms: BTreeSet<String>,
    hanging_latest: BTreeSet<String>,
    transient_versions: BTreeSet<(String, u32)>,
    configs: BTreeMap<String, String>,
    modes: BTreeMap<String, String>,
    latest_calls: BTreeMap<String, Vec<Instant>>,
    version_calls: Vec<(String, u32)>,
}

#[derive(Default)]
pub struct FakeRegistry {
    state: Mutex<FakeState>,
    fail_listing: AtomicBool,
    fail_config: AtomicBool,
    latest_delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put_version(&self, subject: &str, version: u32, body: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .subjects
            .entry(subject.to_string())
            .or_default()
            .insert(version, registered(subject, version, body));
    }

    pub fn put_schema(&self, schema: RegisteredSchema) {
        let mut state = self.state.lock().unwrap();
        state.subjects.entry(schema.subject.clone()).or_default().insert(schema.version, schema);
    }

    pub fn put_versions(&self, subject: &str, count: u32) {
        for version in 1..=count {
            self.put_version(subject, version, &avro_body(&format!("V{version}"), &["id"]));
        }
    }

    pub fn remove_subject(&self, subject: &str) {
        self.state.lock().unwrap().subjects.remove(subject);
    }

    pub fn remove_version(&self, subject: &str, version: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(versions) = state.subjects.get_mut(subject) {
            versions.remove(&version);
        }
    }

    /// Listed by the registry but unknown to the version endpoints.
    pub fn add_phantom(&self, subject: &str) {
        self.state.lock().unwrap().phantoms.insert(subject.to_string());
    }

    /// Fails the next fetch of `version` with a transport error.
    pub fn fail_version_once(&self, subject: &str, version: u32) {
        self.state.lock().unwrap().transient_versions.insert((subject.to_string(), version));
    }

    pub fn hang_latest(&self, subject: &str) {
        self.state.lock().unwrap().hanging_latest.insert(subject.to_string());
    }

    pub fn set_config(&self, subject: &str, level: &str) {
        self.state.lock().unwrap().configs.insert(subject.to_string(), level.to_string());
    }

    pub fn set_mode(&self, subject: &str, mode: &str) {
        self.state.lock().unwrap().modes.insert(subject.to_string(), mode.to_string());
    }

    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    pub fn fail_config(&self, fail: bool) {
        self.fail_config.store(fail, Ordering::SeqCst);
    }

    pub fn delay_latest(&self, delay: Duration) {
        *self.latest_delay.lock().unwrap() = Some(delay);
    }

    pub fn latest_calls(&self, subject: &str) -> Vec<Instant> {
        self.state.lock().unwrap().latest_calls.get(subject).cloned().unwrap_or_default()
    }

    pub fn version_calls(&self) -> Vec<(String, u32)> {
        self.state.lock().unwrap().version_calls.clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaRegistryClient for FakeRegistry {
    async fn list_subjects(&self) -> Result<Vec<String>, RegistryError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(RegistryError::Transport("registry offline".to_string()));
        }
        let state = self.state.lock().unwrap();
        let mut subjects: Vec<String> = state.subjects.keys().cloned().collect();
        subjects.extend(state.phantoms.iter().cloned());
        drop(state);
        Ok(subjects)
    }

    async fn get_latest_version(&self, subject: &str) -> Result<RegisteredSchema, RegistryError> {
        let (hang, latest) = {
            let mut state = self.state.lock().unwrap();
            state.latest_calls.entry(subject.to_string()).or_default().push(Instant::now());
            let latest = state
                .subjects
                .get(subject)
                .and_then(|versions| versions.values().next_back().cloned());
            (state.hanging_latest.contains(subject), latest)
        };
        if hang {
            std::future::pending::<()>().await;
        }
        let delay = *self.latest_delay.lock().unwrap();
        if let Some(delay) = delay {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        latest.ok_or_else(|| RegistryError::NotFound(subject.to_string()))
    }

    async fn get_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<RegisteredSchema, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.version_calls.push((subject.to_string(), version));
        if state.transient_versions.remove(&(subject.to_string(), version)) {
            return Err(RegistryError::Transport(format!("{subject}/{version} reset")));
        }
        state
            .subjects
            .get(subject)
            .and_then(|versions| versions.get(&version).cloned())
            .ok_or_else(|| RegistryError::NotFound(format!("{subject}/{version}")))
    }

    async fn get_config(&self, subject: &str) -> Result<Option<SubjectConfig>, RegistryError> {
        if self.fail_config.load(Ordering::SeqCst) {
            return Err(RegistryError::Transport("config endpoint down".to_string()));
        }
        let state = self.state.lock().unwrap();
        Ok(state.configs.get(subject).map(|level| SubjectConfig {
            compatibility_level: Some(level.clone()),
        }))
    }

    async fn get_mode(&self, subject: &str) -> Result<SubjectMode, RegistryError> {
        let state = self.state.lock().unwrap();
        state
            .modes
            .get(subject)
            .map(|label| SubjectMode::from_label(label))
            .ok_or_else(|| RegistryError::Unsupported("mode".to_string()))
    }
}

// ============================================================================
// SECTION: Failing Store
// ============================================================================

/// Delegates to an in-memory store but rejects version writes for chosen subjects.
pub struct RejectingStore {
    pub inner: InMemoryCatalogStore,
    pub rejected: BTreeSet<String>,
    pub reject_counts: bool,
    /// Barrier the next high-water-mark read waits on before answering.
    pub read_gate: Mutex<Option<Arc<Barrier>>>,
}

impl RejectingStore {
    pub fn new(rejected: &[&str]) -> Self {
        Self {
            inner: InMemoryCatalogStore::new(),
            rejected: rejected.iter().map(|subject| (*subject).to_string()).collect(),
            reject_counts: false,
            read_gate: Mutex::new(None),
        }
    }

    /// Blocks the next high-water-mark read until `gate` is released.
    pub fn gated_on(self, gate: Arc<Barrier>) -> Self {
        *self.read_gate.lock().unwrap() = Some(gate);
        self
    }

    /// Also fails every removal-size count.
    pub fn rejecting_counts(mut self) -> Self {
        self.reject_counts = true;
        self
    }
}

impl CatalogStore for RejectingStore {
    fn latest_version(&self, subject: &str) -> Result<Option<u32>, StoreError> {
        let gate = self.read_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.wait();
        }
        self.inner.latest_version(subject)
    }

    fn upsert_version(
        &self,
        snapshot: &SchemaVersionSnapshot,
    ) -> Result<UpsertOutcome, StoreError> {
        if self.rejected.contains(&snapshot.subject) {
            return Err(StoreError::Store("disk full".to_string()));
        }
        self.inner.upsert_version(snapshot)
    }

    fn update_subject_meta(
        &self,
        subject: &str,
        update: &SubjectMetaUpdate,
    ) -> Result<bool, StoreError> {
        self.inner.update_subject_meta(subject, update)
    }

    fn known_subjects(&self) -> Result<BTreeSet<String>, StoreError> {
        self.inner.known_subjects()
    }

    fn count_rows(&self, subjects: &BTreeSet<String>) -> Result<RemovalCounts, StoreError> {
        if self.reject_counts {
            return Err(StoreError::Store("count timed out".to_string()));
        }
        self.inner.count_rows(subjects)
    }

    fn remove_subjects(&self, subjects: &BTreeSet<String>) -> Result<RemovalCounts, StoreError> {
        self.inner.remove_subjects(subjects)
    }

    fn subject_entry(&self, subject: &str) -> Result<Option<SubjectCatalogEntry>, StoreError> {
        self.inner.subject_entry(subject)
    }

    fn list_subject_entries(&self) -> Result<Vec<SubjectCatalogEntry>, StoreError> {
        self.inner.list_subject_entries()
    }

    fn version_snapshot(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<Option<SchemaVersionSnapshot>, StoreError> {
        self.inner.version_snapshot(subject, version)
    }

    fn list_versions(&self, subject: &str) -> Result<Vec<u32>, StoreError> {
        self.inner.list_versions(subject)
    }

    fn record_artifact(&self, record: &ArtifactRecord) -> Result<(), StoreError> {
        self.inner.record_artifact(record)
    }

    fn record_metadata(&self, record: &MetadataRecord) -> Result<(), StoreError> {
        self.inner.record_metadata(record)
    }
}
