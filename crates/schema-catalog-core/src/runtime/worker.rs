// crates/schema-catalog-core/src/runtime/worker.rs
// ============================================================================
// Module: Subject Sync Worker
// Description: Incremental per-subject catch-up against the registry.
// Purpose: Persist every registry version newer than the local high-water mark.
// Dependencies: tracing, crate::core, crate::interfaces, crate::runtime::gateway
// ============================================================================

//! ## Overview
//! A worker handles one subject per run:
//!
//! 1. read the local high-water mark,
//! 2. ask the registry for its latest version (with retry),
//! 3. skip when the catalog is already current,
//! 4. fetch and persist each missing version in ascending order,
//! 5. refresh subject-level metadata (best effort).
//!
//! Versions are processed sequentially within a subject. A failed version
//! write is counted and skipped; it never aborts the subject. An intermediate
//! version the registry could not serve stops the catch-up at that gap so the
//! high-water mark stays below it and the next run resumes there. Store calls
//! run on the blocking pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::core::Lookup;
use crate::core::RegisteredSchema;
use crate::core::SchemaVersionSnapshot;
use crate::core::SubjectMetaUpdate;
use crate::core::SyncCounters;
use crate::core::UpsertOutcome;
use crate::core::canonicalize_and_hash;
use crate::core::extract_environment;
use crate::core::extract_fields_meta;
use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;
use crate::runtime::gateway::RegistryGateway;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Reason a subject was skipped without changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Local catalog already holds the registry's latest version.
    UpToDate,
    /// Registry reported the subject does not exist.
    NotInRegistry,
}

impl SkipReason {
    /// Returns a stable label for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpToDate => "up_to_date",
            Self::NotInRegistry => "not_in_registry",
        }
    }
}

/// Result of syncing one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectOutcome {
    /// Missing versions were fetched and persisted.
    Synced {
        /// Versions persisted for the first time.
        versions_new: u64,
        /// Subject had no local high-water mark before this run and now has one.
        created: bool,
    },
    /// Catch-up stopped at a version the registry could not serve.
    ///
    /// Versions below the gap are persisted; the gap and everything above it
    /// are left for the next run.
    Interrupted {
        /// Versions persisted for the first time before the gap.
        versions_new: u64,
        /// Subject had no local high-water mark before this run and now has one.
        created: bool,
        /// First version that could not be fetched.
        missing_version: u32,
    },
    /// Nothing to do this run.
    Skipped(SkipReason),
    /// Subject could not be synced this run.
    Failed(String),
}

// ============================================================================
// SECTION: Worker
// ============================================================================

/// Per-subject incremental sync worker.
#[derive(Clone)]
pub struct SubjectSyncWorker {
    /// Registry gateway.
    gateway: RegistryGateway,
    /// Local catalog store.
    store: Arc<dyn CatalogStore>,
    /// Shared run counters.
    counters: Arc<SyncCounters>,
}

impl SubjectSyncWorker {
    /// Creates a worker bound to one run's counters.
    #[must_use]
    pub fn new(
        gateway: RegistryGateway,
        store: Arc<dyn CatalogStore>,
        counters: Arc<SyncCounters>,
    ) -> Self {
        Self {
            gateway,
            store,
            counters,
        }
    }

    /// Brings one subject up to the registry's latest version.
    pub async fn sync_subject(&self, subject: &str) -> SubjectOutcome {
        let owned = subject.to_string();
        let local_latest = match self.with_store(move |store| store.latest_version(&owned)).await {
            Ok(value) => value,
            Err(err) => {
                warn!(subject, error = %err, "failed to read local high-water mark");
                return SubjectOutcome::Failed(err.to_string());
            }
        };

        let latest = match self.gateway.get_latest_version_with_retry(subject).await {
            Lookup::Found(schema) => schema,
            Lookup::NotFound => return SubjectOutcome::Skipped(SkipReason::NotInRegistry),
            Lookup::Unavailable => {
                return SubjectOutcome::Failed("registry latest version unavailable".to_string());
            }
        };
        let target = latest.version;
        if local_latest.is_some_and(|local| target <= local) {
            debug!(subject, version = target, "subject already current");
            return SubjectOutcome::Skipped(SkipReason::UpToDate);
        }

        let first = local_latest.map_or(1, |local| local.saturating_add(1));
        debug!(subject, from = first, to = target, "fetching missing versions");
        let mut versions_new = 0_u64;
        let mut missing_version = None;
        for version in first..target {
            match self.gateway.get_version(subject, version).await {
                Lookup::Found(schema) => {
                    if self.persist_version(subject, version, schema).await {
                        versions_new += 1;
                    }
                }
                Lookup::NotFound => {
                    debug!(subject, version, "version absent from registry; skipping");
                }
                Lookup::Unavailable => {
                    warn!(subject, version, "version unavailable; stopping catch-up at gap");
                    missing_version = Some(version);
                    break;
                }
            }
        }
        if missing_version.is_none() && self.persist_version(subject, target, latest).await {
            versions_new += 1;
        }

        self.refresh_subject_meta(subject).await;

        let created = local_latest.is_none() && versions_new > 0;
        match missing_version {
            Some(missing_version) => SubjectOutcome::Interrupted {
                versions_new,
                created,
                missing_version,
            },
            None => SubjectOutcome::Synced {
                versions_new,
                created,
            },
        }
    }

    /// Runs a store call on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CatalogStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|err| StoreError::Store(format!("store task join failed: {err}")))?
    }

    /// Persists one fetched version. Returns true when a new row was written.
    async fn persist_version(
        &self,
        subject: &str,
        version: u32,
        schema: RegisteredSchema,
    ) -> bool {
        self.counters.record_version_seen();
        let Some(snapshot) = build_snapshot(subject, version, schema) else {
            debug!(subject, version, "registry returned no schema body");
            return false;
        };
        match self.with_store(move |store| store.upsert_version(&snapshot)).await {
            Ok(UpsertOutcome::Inserted) => {
                self.counters.record_version_new();
                true
            }
            Ok(UpsertOutcome::AlreadyPresent) => false,
            Err(err) => {
                warn!(subject, version, error = %err, "failed to persist schema version");
                self.counters.record_error();
                false
            }
        }
    }

    /// Refreshes compatibility, mode, and environment for a subject.
    async fn refresh_subject_meta(&self, subject: &str) {
        let config = self.gateway.get_config(subject).await;
        let mode = self.gateway.get_mode(subject).await;
        let update = SubjectMetaUpdate {
            compatibility_level: config.and_then(|config| config.compatibility_level),
            mode_read_only: mode.map(|mode| mode.is_read_only()),
            environment: extract_environment(subject).map(str::to_string),
        };
        let owned = subject.to_string();
        match self.with_store(move |store| store.update_subject_meta(&owned, &update)).await {
            Ok(true) => {}
            Ok(false) => debug!(subject, "no catalog entry for subject metadata"),
            Err(err) => {
                warn!(subject, error = %err, "failed to update subject metadata");
                self.counters.record_error();
            }
        }
    }
}

// ============================================================================
// SECTION: Snapshot Building
// ============================================================================

/// Derives a version snapshot from a registry response.
///
/// Returns `None` when the registry returned no schema body.
#[must_use]
pub fn build_snapshot(
    subject: &str,
    version: u32,
    schema: RegisteredSchema,
) -> Option<SchemaVersionSnapshot> {
    let RegisteredSchema {
        schema: body,
        references,
        rule_set,
        metadata,
        ..
    } = schema;
    let schema_body = body.schema_str.filter(|text| !text.is_empty())?;
    let canonical_hash = canonicalize_and_hash(&schema_body);
    let fields_meta = if body.schema_type.is_record_format() {
        extract_fields_meta(&schema_body)
    } else {
        None
    };
    Some(SchemaVersionSnapshot {
        subject: subject.to_string(),
        version,
        schema_type: body.schema_type,
        registry_id: body.schema_id,
        schema_body,
        canonical_hash,
        references,
        rule_set,
        registry_metadata: metadata,
        fields_meta,
        lint_report: None,
    })
}
