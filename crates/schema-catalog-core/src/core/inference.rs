// crates/schema-catalog-core/src/core/inference.rs
// ============================================================================
// Module: Schema Catalog Metadata Inference
// Description: Environment tagging and PII-candidate field detection.
// Purpose: Derive governance metadata from subject names and schema bodies.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Inference is heuristic and advisory. Subject names carry an optional
//! leading environment segment (`dev.`, `stg.`, `prod.` or the one-letter
//! abbreviations), and record schemas are scanned for field names containing
//! PII keywords. Neither function fails: unknown shapes yield `None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::catalog::FieldMeta;
use crate::core::catalog::FieldsMeta;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment prefixes in match priority order (full names first).
const ENVIRONMENT_PREFIXES: &[(&str, &str)] = &[
    ("dev.", "dev"),
    ("stg.", "stg"),
    ("prod.", "prod"),
    ("d.", "dev"),
    ("s.", "stg"),
    ("p.", "prod"),
];

/// Lowercase keywords marking a field name as a PII candidate.
pub const PII_KEYWORDS: &[&str] = &["email", "phone", "ssn", "passport", "address", "name"];

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Infers the deployment environment from a subject's leading segment.
///
/// Abbreviated prefixes expand to their full name; the first matching prefix
/// wins.
#[must_use]
pub fn extract_environment(subject: &str) -> Option<&'static str> {
    ENVIRONMENT_PREFIXES
        .iter()
        .find(|(prefix, _)| subject.starts_with(prefix))
        .map(|(_, environment)| *environment)
}

// ============================================================================
// SECTION: Field Metadata
// ============================================================================

/// Returns true when a field name contains any PII keyword.
#[must_use]
pub fn is_pii_candidate(field_name: &str) -> bool {
    let lowered = field_name.to_ascii_lowercase();
    PII_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Extracts declared fields from a record schema body.
///
/// Returns `None` when the body is not JSON or does not declare a `fields`
/// array. Field entries without a string `name` are skipped.
#[must_use]
pub fn extract_fields_meta(schema_body: &str) -> Option<FieldsMeta> {
    let value: Value = serde_json::from_str(schema_body).ok()?;
    let fields = value.get("fields")?.as_array()?;
    let fields = fields
        .iter()
        .filter_map(|field| {
            let name = field.get("name")?.as_str()?;
            Some(FieldMeta {
                name: name.to_string(),
                field_type: field.get("type").cloned().unwrap_or(Value::Null),
                pii_candidate: is_pii_candidate(name),
            })
        })
        .collect();
    Some(FieldsMeta {
        fields,
    })
}
