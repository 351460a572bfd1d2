// crates/schema-catalog-core/src/core/metrics.rs
// ============================================================================
// Module: Sync Metrics
// Description: Per-run counters for catalog synchronization.
// Purpose: Aggregate concurrent worker results into one run report.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`SyncCounters`] is the shared accumulator mutated by concurrent workers
//! through relaxed atomic increments. [`SyncMetrics`] is the immutable report
//! returned once a run completes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Summary of one synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetrics {
    /// Subjects reported by the registry.
    pub subjects_seen: u64,
    /// Subjects synced for the first time.
    pub subjects_new: u64,
    /// Stale subjects removed.
    pub subjects_removed: u64,
    /// Versions fetched from the registry.
    pub versions_seen: u64,
    /// Versions persisted for the first time.
    pub versions_new: u64,
    /// Version snapshots removed with stale subjects.
    pub versions_removed: u64,
    /// Artifact records removed with stale subjects.
    pub artifacts_removed: u64,
    /// Metadata records removed with stale subjects.
    pub metadata_removed: u64,
    /// Errors observed during the run.
    pub errors: u64,
    /// Wall-clock run duration in milliseconds.
    pub duration_ms: u64,
    /// Subjects removed in this run.
    pub removed_subjects: BTreeSet<String>,
}

// ============================================================================
// SECTION: Counters
// ============================================================================

/// Thread-safe counters shared by workers during a run.
#[derive(Debug, Default)]
pub struct SyncCounters {
    /// Subjects reported by the registry.
    subjects_seen: AtomicU64,
    /// Subjects synced for the first time.
    subjects_new: AtomicU64,
    /// Versions fetched from the registry.
    versions_seen: AtomicU64,
    /// Versions persisted for the first time.
    versions_new: AtomicU64,
    /// Errors observed.
    errors: AtomicU64,
}

impl SyncCounters {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds to the subjects-seen counter.
    pub fn add_subjects_seen(&self, count: u64) {
        self.subjects_seen.fetch_add(count, Ordering::Relaxed);
    }

    /// Records a first-time subject sync.
    pub fn record_subject_new(&self) {
        self.subjects_new.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a version fetched from the registry.
    pub fn record_version_seen(&self) {
        self.versions_seen.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a version persisted for the first time.
    pub fn record_version_new(&self) {
        self.versions_new.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an error.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counter values into a metrics report.
    pub fn snapshot_into(&self, metrics: &mut SyncMetrics) {
        metrics.subjects_seen = self.subjects_seen.load(Ordering::Relaxed);
        metrics.subjects_new = self.subjects_new.load(Ordering::Relaxed);
        metrics.versions_seen = self.versions_seen.load(Ordering::Relaxed);
        metrics.versions_new = self.versions_new.load(Ordering::Relaxed);
        metrics.errors = self.errors.load(Ordering::Relaxed);
    }
}
