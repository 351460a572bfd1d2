// crates/schema-catalog-config/src/lib.rs
// ============================================================================
// Module: Schema Catalog Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for schema-catalog.toml semantics.
// Dependencies: schema-catalog-core, serde, toml
// ============================================================================

//! ## Overview
//! `schema-catalog-config` defines the configuration model for the catalog
//! sync binary. Loading is strict and fail-closed: oversized, non-UTF-8, or
//! out-of-range input is rejected before any component is built.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
