// crates/schema-catalog-core/src/lib.rs
// ============================================================================
// Module: Schema Catalog Core Library
// Description: Public API surface for the catalog synchronization engine.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Schema catalog core keeps a local, queryable catalog consistent with an
//! external schema registry. It replicates subjects and versions
//! incrementally, removes subjects that vanished upstream, and derives
//! governance metadata (canonical hashes, environment tags, PII candidates)
//! during ingestion. Registry and storage backends plug in through
//! [`SchemaRegistryClient`] and [`CatalogStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use interfaces::CatalogStore;
pub use interfaces::RegistryError;
pub use interfaces::SchemaRegistryClient;
pub use interfaces::StoreError;
pub use runtime::GatewayConfig;
pub use runtime::InMemoryCatalogStore;
pub use runtime::ReconcileReport;
pub use runtime::RegistryGateway;
pub use runtime::SkipReason;
pub use runtime::StaleEntryReconciler;
pub use runtime::SubjectOutcome;
pub use runtime::SubjectSyncWorker;
pub use runtime::SyncConfig;
pub use runtime::SyncOrchestrator;
