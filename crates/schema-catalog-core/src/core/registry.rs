// crates/schema-catalog-core/src/core/registry.rs
// ============================================================================
// Module: Schema Registry Response Types
// Description: Typed views of schema registry responses.
// Purpose: Represent optional registry fields explicitly instead of probing.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Registry responses are decoded into fixed shapes where every optional
//! field is an `Option`. [`Lookup`] is the tagged result the sync gateway
//! hands to callers so that "not found" and "unavailable" are branches, not
//! errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::catalog::SchemaReference;
use crate::core::catalog::SchemaType;

// ============================================================================
// SECTION: Registered Schema
// ============================================================================

/// Schema content for a registered version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaBody {
    /// Raw schema text. Empty or missing bodies are `None`.
    pub schema_str: Option<String>,
    /// Schema dialect.
    pub schema_type: SchemaType,
    /// Registry-assigned global schema identifier.
    pub schema_id: Option<i64>,
}

/// A registered schema version as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSchema {
    /// Subject the version belongs to.
    pub subject: String,
    /// Version number.
    pub version: u32,
    /// Schema content.
    pub schema: SchemaBody,
    /// Ordered schema references, when declared.
    pub references: Option<Vec<SchemaReference>>,
    /// Data contract rule set, when the registry exposes one.
    pub rule_set: Option<Value>,
    /// Data contract metadata, when the registry exposes one.
    pub metadata: Option<Value>,
}

// ============================================================================
// SECTION: Subject Settings
// ============================================================================

/// Subject-level compatibility configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfig {
    /// Compatibility level (for example `BACKWARD`).
    pub compatibility_level: Option<String>,
}

/// Subject write mode reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectMode {
    /// Subject rejects new registrations.
    ReadOnly,
    /// Any other mode label, kept verbatim.
    Other(String),
}

impl SubjectMode {
    /// Maps a registry mode label to a [`SubjectMode`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("READONLY") {
            Self::ReadOnly
        } else {
            Self::Other(label.to_string())
        }
    }

    /// Returns true for read-only subjects.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Tagged outcome of a gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Registry returned the value.
    Found(T),
    /// Registry affirmatively reported the item does not exist.
    NotFound,
    /// Registry could not be reached in time or failed.
    Unavailable,
}

impl<T> Lookup<T> {
    /// Converts to an `Option`, folding both negative branches into `None`.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::Unavailable => None,
        }
    }
}
