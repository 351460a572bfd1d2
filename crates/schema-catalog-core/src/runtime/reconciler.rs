// crates/schema-catalog-core/src/runtime/reconciler.rs
// ============================================================================
// Module: Stale Entry Reconciler
// Description: Removes catalog subjects that disappeared from the registry.
// Purpose: Keep the catalog a subset of the registry's current subjects.
// Dependencies: tracing, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Stale subjects are those referenced by any catalog table but absent from
//! the registry's subject list. They are removed together with every
//! dependent row in one store transaction. The dependent rows are counted
//! first and logged as a preview before anything is deleted. When nothing is
//! stale the store is not written to at all.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Subjects removed from the catalog.
    pub removed_subjects: BTreeSet<String>,
    /// Version snapshots removed.
    pub versions_removed: u64,
    /// Artifact records removed.
    pub artifacts_removed: u64,
    /// Metadata records removed.
    pub metadata_removed: u64,
}

// ============================================================================
// SECTION: Reconciler
// ============================================================================

/// Computes and removes stale catalog subjects.
#[derive(Clone)]
pub struct StaleEntryReconciler {
    /// Local catalog store.
    store: Arc<dyn CatalogStore>,
}

impl StaleEntryReconciler {
    /// Creates a reconciler over a catalog store.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
        }
    }

    /// Returns locally known subjects missing from the registry list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the known subjects cannot be read.
    pub fn stale_subjects(
        &self,
        registry_subjects: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, StoreError> {
        let known = self.store.known_subjects()?;
        Ok(known.difference(registry_subjects).cloned().collect())
    }

    /// Removes every stale subject and its dependent rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the stale set cannot be computed, the
    /// preview count fails, or the removal transaction fails; on failure
    /// nothing is removed.
    pub fn reconcile(
        &self,
        registry_subjects: &BTreeSet<String>,
    ) -> Result<ReconcileReport, StoreError> {
        let stale = self.stale_subjects(registry_subjects)?;
        if stale.is_empty() {
            return Ok(ReconcileReport::default());
        }
        let preview = self.store.count_rows(&stale)?;
        debug!(
            subjects = stale.len(),
            versions = preview.versions,
            artifacts = preview.artifacts,
            metadata = preview.metadata,
            "removing stale subjects"
        );
        let counts = self.store.remove_subjects(&stale)?;
        info!(
            subjects = stale.len(),
            versions = counts.versions,
            artifacts = counts.artifacts,
            metadata = counts.metadata,
            "removed stale subjects"
        );
        Ok(ReconcileReport {
            removed_subjects: stale,
            versions_removed: counts.versions,
            artifacts_removed: counts.artifacts,
            metadata_removed: counts.metadata,
        })
    }
}
