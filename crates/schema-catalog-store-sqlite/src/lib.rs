// crates/schema-catalog-store-sqlite/src/lib.rs
// ============================================================================
// Module: Schema Catalog SQLite Store
// Description: SQLite-backed implementation of the catalog store interface.
// Purpose: Persist subjects, schema versions, and governance rows durably.
// Dependencies: schema-catalog-core, rusqlite
// ============================================================================

//! ## Overview
//! Provides [`SqliteCatalogStore`], a durable [`schema_catalog_core::CatalogStore`]
//! backed by `SQLite`. Each trait operation runs in its own transaction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_BUSY_TIMEOUT_MS;
pub use store::SqliteCatalogStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
