// crates/schema-catalog-cli/src/report.rs
// ============================================================================
// Module: Catalog Reports
// Description: Read-side views printed by the `catalog` commands.
// Dependencies: schema-catalog-core, serde
// ============================================================================

//! Read-side catalog views.

use schema_catalog_core::CatalogStore;
use schema_catalog_core::StoreError;
use schema_catalog_core::SubjectCatalogEntry;
use serde::Serialize;

/// Catalog entry plus the versions persisted for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectReport {
    /// Subject-level catalog entry.
    pub entry: SubjectCatalogEntry,
    /// Persisted version numbers, ascending.
    pub versions: Vec<u32>,
}

/// Loads the report for `subject`, or `None` when it is not cataloged.
///
/// # Errors
///
/// Returns [`StoreError`] when the store cannot be read.
pub fn subject_report(
    store: &dyn CatalogStore,
    subject: &str,
) -> Result<Option<SubjectReport>, StoreError> {
    let Some(entry) = store.subject_entry(subject)? else {
        return Ok(None);
    };
    let versions = store.list_versions(subject)?;
    Ok(Some(SubjectReport {
        entry,
        versions,
    }))
}
