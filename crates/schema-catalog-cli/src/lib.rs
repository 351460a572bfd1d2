// crates/schema-catalog-cli/src/lib.rs
// ============================================================================
// Module: Schema Catalog CLI Library
// Description: Shared helpers for the schema-catalog command-line interface.
// Purpose: Keep component wiring and scheduling testable outside main.
// Dependencies: schema-catalog-config, schema-catalog-core, tokio
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) parses arguments and formats
//! output; everything it runs lives here so integration tests can drive it
//! with an in-process registry.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bootstrap;
pub mod report;
pub mod schedule;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bootstrap::BootstrapError;
pub use bootstrap::SyncComponents;
pub use bootstrap::build_components;
pub use report::SubjectReport;
pub use report::subject_report;
pub use schedule::run_periodic;
