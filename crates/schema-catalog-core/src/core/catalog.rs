// crates/schema-catalog-core/src/core/catalog.rs
// ============================================================================
// Module: Schema Catalog Entities
// Description: Subject entries, version snapshots, and dependent records.
// Purpose: Define the row shapes persisted by catalog stores.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The catalog mirrors the registry in three shapes: one
//! [`SubjectCatalogEntry`] per subject, one immutable [`SchemaVersionSnapshot`]
//! per `(subject, version)`, and the dependent [`ArtifactRecord`] /
//! [`MetadataRecord`] rows written by downstream subsystems.
//!
//! Invariants:
//! - `latest_version` on a subject entry never decreases while the entry
//!   exists.
//! - A snapshot's `schema_body` and `canonical_hash` never change once written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Schema Type
// ============================================================================

/// Schema dialects understood by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    /// Apache Avro (registry default when the type is omitted).
    #[default]
    Avro,
    /// JSON Schema.
    Json,
    /// Protocol Buffers.
    Protobuf,
}

impl SchemaType {
    /// Returns the registry label for the schema type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avro => "AVRO",
            Self::Json => "JSON",
            Self::Protobuf => "PROTOBUF",
        }
    }

    /// Parses a registry label, case-insensitively.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "AVRO" => Some(Self::Avro),
            "JSON" => Some(Self::Json),
            "PROTOBUF" => Some(Self::Protobuf),
            _ => None,
        }
    }

    /// Returns true when bodies of this type are structured records whose
    /// declared fields can be inspected.
    #[must_use]
    pub const fn is_record_format(self) -> bool {
        matches!(self, Self::Avro)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Schema References
// ============================================================================

/// Reference from one schema to a named schema in another subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReference {
    /// Reference name as used inside the referencing schema.
    pub name: String,
    /// Subject holding the referenced schema.
    pub subject: String,
    /// Version of the referenced schema.
    pub version: u32,
}

// ============================================================================
// SECTION: Field Metadata
// ============================================================================

/// Derived metadata for a single declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Declared field name.
    pub name: String,
    /// Declared field type, copied verbatim from the schema body.
    #[serde(rename = "type")]
    pub field_type: Value,
    /// Field name matches a PII keyword.
    pub pii_candidate: bool,
}

/// Derived field listing for record-structured schemas.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldsMeta {
    /// Fields in declaration order.
    pub fields: Vec<FieldMeta>,
}

impl FieldsMeta {
    /// Returns the number of fields flagged as PII candidates.
    #[must_use]
    pub fn pii_candidate_count(&self) -> usize {
        self.fields.iter().filter(|field| field.pii_candidate).count()
    }
}

// ============================================================================
// SECTION: Subject Entry
// ============================================================================

/// Catalog entry for one registry subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectCatalogEntry {
    /// Registry subject name (primary key).
    pub subject: String,
    /// Highest version the catalog has persisted.
    pub latest_version: Option<u32>,
    /// Compatibility level reported by the registry.
    pub compatibility_level: Option<String>,
    /// Registry reports the subject as read-only.
    pub mode_read_only: bool,
    /// Environment inferred from the subject name.
    pub environment: Option<String>,
    /// Owning team, set by manual tagging only.
    pub owner_team: Option<String>,
    /// Advisory PII score in `[0, 1]`.
    pub pii_score: f64,
    /// Advisory risk score in `[0, 1]`.
    pub risk_score: f64,
}

impl SubjectCatalogEntry {
    /// Creates an entry with no synced versions and default scores.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            latest_version: None,
            compatibility_level: None,
            mode_read_only: false,
            environment: None,
            owner_team: None,
            pii_score: 0.0,
            risk_score: 0.0,
        }
    }
}

/// Partial subject-level update applied after version sync.
///
/// `None` fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectMetaUpdate {
    /// Compatibility level from the registry config endpoint.
    pub compatibility_level: Option<String>,
    /// Read-only flag from the registry mode endpoint.
    pub mode_read_only: Option<bool>,
    /// Environment inferred from the subject name.
    pub environment: Option<String>,
}

// ============================================================================
// SECTION: Version Snapshot
// ============================================================================

/// Immutable snapshot of one registered schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaVersionSnapshot {
    /// Registry subject name.
    pub subject: String,
    /// Registry version number.
    pub version: u32,
    /// Schema dialect.
    pub schema_type: SchemaType,
    /// Registry-assigned global schema identifier.
    pub registry_id: Option<i64>,
    /// Raw schema body exactly as returned by the registry.
    pub schema_body: String,
    /// Canonical content hash of `schema_body`.
    pub canonical_hash: String,
    /// Ordered schema references.
    pub references: Option<Vec<SchemaReference>>,
    /// Registry rule set, copied verbatim.
    pub rule_set: Option<Value>,
    /// Registry metadata, copied verbatim.
    pub registry_metadata: Option<Value>,
    /// Derived field metadata for record formats.
    pub fields_meta: Option<FieldsMeta>,
    /// Lint report owned by a separate subsystem.
    pub lint_report: Option<Value>,
}

/// Result of writing a version snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Snapshot was written for the first time.
    Inserted,
    /// Snapshot already existed and was left untouched.
    AlreadyPresent,
}

// ============================================================================
// SECTION: Dependent Records
// ============================================================================

/// Artifact row attached to a subject by downstream subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Owning subject.
    pub subject: String,
    /// Version the artifact was derived from, when version-specific.
    pub version: Option<u32>,
    /// Artifact kind label (for example `codegen` or `docs`).
    pub kind: String,
    /// Opaque artifact payload.
    pub payload: Value,
}

/// Key/value metadata row attached to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Owning subject.
    pub subject: String,
    /// Metadata key, unique per subject.
    pub key: String,
    /// Metadata value.
    pub value: Value,
}

// ============================================================================
// SECTION: Removal Counts
// ============================================================================

/// Row counts removed by a cascading subject deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalCounts {
    /// Subject entries removed.
    pub subjects: u64,
    /// Version snapshots removed.
    pub versions: u64,
    /// Artifact records removed.
    pub artifacts: u64,
    /// Metadata records removed.
    pub metadata: u64,
}
