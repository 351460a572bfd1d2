// crates/schema-catalog-core/src/runtime/store.rs
// ============================================================================
// Module: Schema Catalog In-Memory Store
// Description: Simple in-memory catalog store for tests and local runs.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`CatalogStore`]. All
//! tables live behind one mutex, so every operation is atomic. It is not
//! durable and is intended for tests and dry runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::ArtifactRecord;
use crate::core::MetadataRecord;
use crate::core::RemovalCounts;
use crate::core::SchemaVersionSnapshot;
use crate::core::SubjectCatalogEntry;
use crate::core::SubjectMetaUpdate;
use crate::core::UpsertOutcome;
use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Catalog tables held in memory.
#[derive(Debug, Default)]
struct CatalogTables {
    /// Subject entries keyed by subject.
    subjects: BTreeMap<String, SubjectCatalogEntry>,
    /// Version snapshots keyed by `(subject, version)`.
    versions: BTreeMap<(String, u32), SchemaVersionSnapshot>,
    /// Artifact records in insertion order.
    artifacts: Vec<ArtifactRecord>,
    /// Metadata records keyed by `(subject, key)`.
    metadata: BTreeMap<(String, String), MetadataRecord>,
}

/// In-memory catalog store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogStore {
    /// Catalog tables protected by a mutex.
    tables: Arc<Mutex<CatalogTables>>,
}

impl InMemoryCatalogStore {
    /// Creates an empty in-memory catalog store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the catalog tables.
    fn lock(&self) -> Result<MutexGuard<'_, CatalogTables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Store("catalog store mutex poisoned".to_string()))
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn latest_version(&self, subject: &str) -> Result<Option<u32>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.subjects.get(subject).and_then(|entry| entry.latest_version))
    }

    fn upsert_version(
        &self,
        snapshot: &SchemaVersionSnapshot,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut guard = self.lock()?;
        let key = (snapshot.subject.clone(), snapshot.version);
        let outcome = if guard.versions.contains_key(&key) {
            UpsertOutcome::AlreadyPresent
        } else {
            guard.versions.insert(key, snapshot.clone());
            UpsertOutcome::Inserted
        };
        let entry = guard
            .subjects
            .entry(snapshot.subject.clone())
            .or_insert_with(|| SubjectCatalogEntry::new(snapshot.subject.clone()));
        entry.latest_version = Some(
            entry.latest_version.map_or(snapshot.version, |current| current.max(snapshot.version)),
        );
        drop(guard);
        Ok(outcome)
    }

    fn update_subject_meta(
        &self,
        subject: &str,
        update: &SubjectMetaUpdate,
    ) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        let Some(entry) = guard.subjects.get_mut(subject) else {
            return Ok(false);
        };
        if let Some(level) = &update.compatibility_level {
            entry.compatibility_level = Some(level.clone());
        }
        if let Some(read_only) = update.mode_read_only {
            entry.mode_read_only = read_only;
        }
        if let Some(environment) = &update.environment {
            entry.environment = Some(environment.clone());
        }
        drop(guard);
        Ok(true)
    }

    fn known_subjects(&self) -> Result<BTreeSet<String>, StoreError> {
        let guard = self.lock()?;
        let mut known: BTreeSet<String> = guard.subjects.keys().cloned().collect();
        known.extend(guard.versions.keys().map(|(subject, _)| subject.clone()));
        known.extend(guard.artifacts.iter().map(|record| record.subject.clone()));
        known.extend(guard.metadata.keys().map(|(subject, _)| subject.clone()));
        drop(guard);
        Ok(known)
    }

    fn count_rows(&self, subjects: &BTreeSet<String>) -> Result<RemovalCounts, StoreError> {
        let guard = self.lock()?;
        Ok(count_tables(&guard, subjects))
    }

    fn remove_subjects(&self, subjects: &BTreeSet<String>) -> Result<RemovalCounts, StoreError> {
        let mut guard = self.lock()?;
        let counts = count_tables(&guard, subjects);
        guard.versions.retain(|(subject, _), _| !subjects.contains(subject));
        guard.artifacts.retain(|record| !subjects.contains(&record.subject));
        guard.metadata.retain(|(subject, _), _| !subjects.contains(subject));
        guard.subjects.retain(|subject, _| !subjects.contains(subject));
        drop(guard);
        Ok(counts)
    }

    fn subject_entry(&self, subject: &str) -> Result<Option<SubjectCatalogEntry>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.subjects.get(subject).cloned())
    }

    fn list_subject_entries(&self) -> Result<Vec<SubjectCatalogEntry>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.subjects.values().cloned().collect())
    }

    fn version_snapshot(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<Option<SchemaVersionSnapshot>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.versions.get(&(subject.to_string(), version)).cloned())
    }

    fn list_versions(&self, subject: &str) -> Result<Vec<u32>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .versions
            .keys()
            .filter(|(owner, _)| owner == subject)
            .map(|(_, version)| *version)
            .collect())
    }

    fn record_artifact(&self, record: &ArtifactRecord) -> Result<(), StoreError> {
        self.lock()?.artifacts.push(record.clone());
        Ok(())
    }

    fn record_metadata(&self, record: &MetadataRecord) -> Result<(), StoreError> {
        self.lock()?
            .metadata
            .insert((record.subject.clone(), record.key.clone()), record.clone());
        Ok(())
    }
}

/// Counts rows referencing any of the given subjects.
fn count_tables(tables: &CatalogTables, subjects: &BTreeSet<String>) -> RemovalCounts {
    let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
    RemovalCounts {
        subjects: count(tables.subjects.keys().filter(|subject| subjects.contains(*subject)).count()),
        versions: count(
            tables.versions.keys().filter(|(subject, _)| subjects.contains(subject)).count(),
        ),
        artifacts: count(
            tables.artifacts.iter().filter(|record| subjects.contains(&record.subject)).count(),
        ),
        metadata: count(
            tables.metadata.keys().filter(|(subject, _)| subjects.contains(subject)).count(),
        ),
    }
}
