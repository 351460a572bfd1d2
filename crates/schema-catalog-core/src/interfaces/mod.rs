// crates/schema-catalog-core/src/interfaces/mod.rs
// ============================================================================
// Module: Schema Catalog Interfaces
// Description: Backend-agnostic interfaces for the registry and catalog store.
// Purpose: Define the contract surfaces used by the sync runtime.
// Dependencies: async-trait, crate::core
// ============================================================================

//! ## Overview
//! The sync runtime depends on two collaborators: a [`SchemaRegistryClient`]
//! speaking to the authoritative registry, and a [`CatalogStore`] holding
//! the local catalog. Both are injected explicitly; there is no process-wide
//! client state.
//!
//! Store operations are transactional per call: each method commits on
//! success and rolls back on error, so a failed call leaves no partial rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::ArtifactRecord;
use crate::core::MetadataRecord;
use crate::core::RegisteredSchema;
use crate::core::RemovalCounts;
use crate::core::SchemaVersionSnapshot;
use crate::core::SubjectCatalogEntry;
use crate::core::SubjectConfig;
use crate::core::SubjectMetaUpdate;
use crate::core::SubjectMode;
use crate::core::UpsertOutcome;

// ============================================================================
// SECTION: Schema Registry Client
// ============================================================================

/// Schema registry client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registry reported that the subject or version does not exist.
    #[error("registry item not found: {0}")]
    NotFound(String),
    /// Registry does not support the requested operation.
    #[error("registry operation unsupported: {0}")]
    Unsupported(String),
    /// Transport-level or server-side failure.
    #[error("registry transport error: {0}")]
    Transport(String),
    /// Registry response could not be decoded.
    #[error("registry protocol error: {0}")]
    Protocol(String),
}

/// Client for the authoritative schema registry.
///
/// Calls may hang; callers apply their own deadlines.
#[async_trait]
pub trait SchemaRegistryClient: Send + Sync {
    /// Lists every subject currently registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the subject list cannot be fetched.
    async fn list_subjects(&self) -> Result<Vec<String>, RegistryError>;

    /// Fetches the latest registered version of a subject.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown subjects and other
    /// variants on failure.
    async fn get_latest_version(&self, subject: &str) -> Result<RegisteredSchema, RegistryError>;

    /// Fetches a specific registered version of a subject.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown versions and other
    /// variants on failure.
    async fn get_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<RegisteredSchema, RegistryError>;

    /// Fetches the compatibility configuration of a subject.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the configuration cannot be fetched.
    async fn get_config(&self, subject: &str) -> Result<Option<SubjectConfig>, RegistryError>;

    /// Fetches the write mode of a subject.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unsupported`] when the registry has no mode
    /// endpoint and other variants on failure.
    async fn get_mode(&self, subject: &str) -> Result<SubjectMode, RegistryError>;
}

// ============================================================================
// SECTION: Catalog Store
// ============================================================================

/// Catalog store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Store backend error (including write conflicts).
    #[error("store error: {0}")]
    Store(String),
    /// Store contents are corrupt.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid data was supplied or read.
    #[error("store invalid data: {0}")]
    Invalid(String),
}

/// Transactional local catalog.
pub trait CatalogStore: Send + Sync {
    /// Returns the stored high-water mark for a subject.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn latest_version(&self, subject: &str) -> Result<Option<u32>, StoreError>;

    /// Writes a version snapshot if absent and ratchets the subject's
    /// high-water mark, creating the subject entry on first version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails; nothing is persisted.
    fn upsert_version(
        &self,
        snapshot: &SchemaVersionSnapshot,
    ) -> Result<UpsertOutcome, StoreError>;

    /// Applies subject-level metadata. Returns false when the subject has no
    /// entry yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_subject_meta(
        &self,
        subject: &str,
        update: &SubjectMetaUpdate,
    ) -> Result<bool, StoreError>;

    /// Returns every subject referenced by any catalog table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn known_subjects(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Counts rows that reference the given subjects in each table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn count_rows(&self, subjects: &BTreeSet<String>) -> Result<RemovalCounts, StoreError>;

    /// Deletes all rows for the given subjects in one transaction, dependents
    /// first, and returns the removed row counts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails; nothing is removed.
    fn remove_subjects(&self, subjects: &BTreeSet<String>) -> Result<RemovalCounts, StoreError>;

    /// Loads a subject entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn subject_entry(&self, subject: &str) -> Result<Option<SubjectCatalogEntry>, StoreError>;

    /// Lists all subject entries ordered by subject.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list_subject_entries(&self) -> Result<Vec<SubjectCatalogEntry>, StoreError>;

    /// Loads one version snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn version_snapshot(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<Option<SchemaVersionSnapshot>, StoreError>;

    /// Lists stored version numbers for a subject in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list_versions(&self, subject: &str) -> Result<Vec<u32>, StoreError>;

    /// Appends an artifact record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn record_artifact(&self, record: &ArtifactRecord) -> Result<(), StoreError>;

    /// Inserts or replaces a metadata record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn record_metadata(&self, record: &MetadataRecord) -> Result<(), StoreError>;
}
