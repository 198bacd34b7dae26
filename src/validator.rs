//! Structural checks on input documents before conversion.
//!
//! Each input mode has a small contract schema naming the fields the
//! converter relies on. Violations are reported together as one
//! `ConvertError::InvalidDocument`.

use serde_json::{json, Value};

use crate::csdl::InputMode;
use crate::error::ConvertError;

fn contract(mode: InputMode) -> Value {
    match mode {
        InputMode::MockUp => json!({
            "type": "object",
            "required": ["@odata.type"],
            "properties": {
                "@odata.type": { "type": "string", "minLength": 1 }
            }
        }),
        InputMode::JsonSchema => json!({
            "type": "object",
            "required": ["title", "properties"],
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "properties": {
                    "type": "object",
                    "additionalProperties": { "type": ["object", "boolean"] }
                },
                "required": { "type": "array", "items": { "type": "string" } }
            }
        }),
    }
}

/// Check that `document` has the fields its input mode requires.
///
/// # Errors
///
/// Returns `ConvertError::InvalidDocument` listing every violation, or
/// `ConvertError::InvalidSchema` if the contract itself fails to compile.
pub fn check_document(document: &Value, mode: InputMode) -> Result<(), ConvertError> {
    let contract = contract(mode);
    let validator = jsonschema::validator_for(&contract).map_err(|e| {
        ConvertError::InvalidSchema {
            message: e.to_string(),
        }
    })?;

    let errors: Vec<String> = validator
        .iter_errors(document)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConvertError::InvalidDocument {
            message: errors.join("; "),
        })
    }
}
