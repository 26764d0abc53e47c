//! Structural checks of Swagger 2.0 documents.
//!
//! This is not full OpenAPI validation. It checks the envelope the
//! aggregator relies on: a `swagger` field equal to `"2.0"` and object-valued
//! `info`, `paths`, `definitions` and `securityDefinitions` when present.

use serde_json::{json, Value};

use crate::error::SchemaError;

/// JSON Schema describing the document envelope.
pub fn envelope_schema() -> Value {
    json!({
        "type": "object",
        "required": ["swagger"],
        "properties": {
            "swagger": { "const": "2.0" },
            "info": { "type": "object" },
            "host": { "type": "string" },
            "basePath": { "type": "string" },
            "paths": {
                "type": "object",
                "additionalProperties": { "type": "object" }
            },
            "definitions": {
                "type": "object",
                "additionalProperties": { "type": "object" }
            },
            "securityDefinitions": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "required": ["type"]
                }
            }
        }
    })
}

/// Check a document against [`envelope_schema`].
pub fn check_structure(document: &Value) -> Vec<SchemaError> {
    validate_against_schema(&envelope_schema(), document)
}

/// Validate `instance` against `schema`, collecting every error.
///
/// A schema that does not compile is reported as a single error at the root.
pub fn validate_against_schema(schema: &Value, instance: &Value) -> Vec<SchemaError> {
    let validator = match jsonschema::validator_for(schema) {
        Ok(validator) => validator,
        Err(e) => {
            return vec![SchemaError {
                path: String::new(),
                message: format!("invalid schema: {}", e),
            }]
        }
    };

    validator
        .iter_errors(instance)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect()
}
