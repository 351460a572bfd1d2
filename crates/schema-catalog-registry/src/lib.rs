// crates/schema-catalog-registry/src/lib.rs
// ============================================================================
// Module: Schema Catalog Registry Client
// Description: HTTP implementation of the schema registry client interface.
// Purpose: Talk to Confluent-compatible registries over REST.
// Dependencies: schema-catalog-core, reqwest, url
// ============================================================================

//! ## Overview
//! Provides [`HttpRegistryClient`], an implementation of
//! [`schema_catalog_core::SchemaRegistryClient`] for registries exposing the
//! Confluent REST API. Deadlines and retries are applied by the core gateway;
//! this crate only maps HTTP responses into registry outcomes.
//!
//! Security posture: registry responses are untrusted; bodies are size
//! limited and credentials are never logged.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::DEFAULT_MAX_RESPONSE_BYTES;
pub use client::DEFAULT_USER_AGENT;
pub use client::HttpRegistryClient;
pub use client::HttpRegistryConfig;
pub use client::HttpRegistryError;
