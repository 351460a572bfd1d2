// crates/schema-catalog-core/src/core/mod.rs
// ============================================================================
// Module: Schema Catalog Core Types
// Description: Catalog entities, registry views, hashing, and inference.
// Purpose: Provide stable, serializable types shared by every catalog crate.
// Dependencies: serde, serde_jcs, serde_json, sha2
// ============================================================================

//! ## Overview
//! Core types define the catalog rows, the registry response shapes, the
//! per-run metrics report, and the pure derivation helpers (canonical hashing
//! and metadata inference). Nothing here performs I/O.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod hashing;
pub mod inference;
pub mod metrics;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::ArtifactRecord;
pub use catalog::FieldMeta;
pub use catalog::FieldsMeta;
pub use catalog::MetadataRecord;
pub use catalog::RemovalCounts;
pub use catalog::SchemaReference;
pub use catalog::SchemaType;
pub use catalog::SchemaVersionSnapshot;
pub use catalog::SubjectCatalogEntry;
pub use catalog::SubjectMetaUpdate;
pub use catalog::UpsertOutcome;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::canonicalize_and_hash;
pub use inference::extract_environment;
pub use inference::extract_fields_meta;
pub use metrics::SyncCounters;
pub use metrics::SyncMetrics;
pub use registry::Lookup;
pub use registry::RegisteredSchema;
pub use registry::SchemaBody;
pub use registry::SubjectConfig;
pub use registry::SubjectMode;
