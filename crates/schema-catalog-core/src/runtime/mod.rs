// crates/schema-catalog-core/src/runtime/mod.rs
// ============================================================================
// Module: Schema Catalog Runtime
// Description: Sync engine components built on the core interfaces.
// Purpose: Replicate registry state into the local catalog.
// Dependencies: crate::core, crate::interfaces, tokio, tracing
// ============================================================================

//! ## Overview
//! The runtime wires the registry gateway, per-subject workers, and the stale
//! entry reconciler under a single orchestrator. Only the gateway and the
//! store perform I/O; everything else is deterministic.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod gateway;
pub mod orchestrator;
pub mod reconciler;
pub mod store;
pub mod worker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gateway::GatewayConfig;
pub use gateway::RegistryGateway;
pub use orchestrator::DEFAULT_MAX_CONCURRENT;
pub use orchestrator::SyncConfig;
pub use orchestrator::SyncOrchestrator;
pub use reconciler::ReconcileReport;
pub use reconciler::StaleEntryReconciler;
pub use store::InMemoryCatalogStore;
pub use worker::SkipReason;
pub use worker::SubjectOutcome;
pub use worker::SubjectSyncWorker;
pub use worker::build_snapshot;
