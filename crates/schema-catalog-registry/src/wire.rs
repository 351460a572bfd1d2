// crates/schema-catalog-registry/src/wire.rs
// ============================================================================
// Module: Registry Wire Types
// Description: Serde shapes of Confluent registry REST payloads.
// Purpose: Decode registry responses into core registry views.
// Dependencies: serde, serde_json, schema-catalog-core
// ============================================================================

//! Registry JSON payloads. Every optional field is an `Option` so absent
//! attributes decode to `None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use schema_catalog_core::RegisteredSchema;
use schema_catalog_core::SchemaBody;
use schema_catalog_core::SchemaReference;
use schema_catalog_core::SchemaType;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Body of `GET /subjects/{subject}/versions/{version}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSchema {
    /// Subject name echoed by the registry.
    #[serde(default)]
    pub subject: Option<String>,
    /// Version number.
    pub version: u32,
    /// Global schema identifier.
    #[serde(default)]
    pub id: Option<i64>,
    /// Raw schema text.
    #[serde(default)]
    pub schema: Option<String>,
    /// Schema type label; absent means AVRO.
    #[serde(default)]
    pub schema_type: Option<String>,
    /// Schema references.
    #[serde(default)]
    pub references: Option<Vec<WireReference>>,
    /// Data contract metadata.
    #[serde(default)]
    pub metadata: Option<Value>,
    /// Data contract rule set.
    #[serde(default)]
    pub rule_set: Option<Value>,
}

/// Schema reference entry.
#[derive(Debug, Deserialize)]
pub struct WireReference {
    /// Reference name.
    pub name: String,
    /// Referenced subject.
    pub subject: String,
    /// Referenced version.
    pub version: u32,
}

/// Body of `GET /config/{subject}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireConfig {
    /// Compatibility level.
    #[serde(default)]
    pub compatibility_level: Option<String>,
}

/// Body of `GET /mode/{subject}`.
#[derive(Debug, Deserialize)]
pub struct WireMode {
    /// Mode label.
    pub mode: String,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct WireError {
    /// Registry error code.
    #[serde(default)]
    pub error_code: Option<i64>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// SECTION: Conversion
// ============================================================================

impl WireSchema {
    /// Converts the payload into a registered schema for `subject`.
    ///
    /// Returns `None` when the schema type label is unknown.
    pub fn into_registered(self, subject: &str) -> Option<RegisteredSchema> {
        let schema_type = match self.schema_type.as_deref() {
            None => SchemaType::Avro,
            Some(label) => SchemaType::parse(label)?,
        };
        let references = self.references.map(|references| {
            references
                .into_iter()
                .map(|reference| SchemaReference {
                    name: reference.name,
                    subject: reference.subject,
                    version: reference.version,
                })
                .collect()
        });
        Some(RegisteredSchema {
            subject: self.subject.unwrap_or_else(|| subject.to_string()),
            version: self.version,
            schema: SchemaBody {
                schema_str: self.schema.filter(|text| !text.is_empty()),
                schema_type,
                schema_id: self.id,
            },
            references,
            rule_set: self.rule_set,
            metadata: self.metadata,
        })
    }
}
