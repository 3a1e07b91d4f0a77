//! Inventory document encoding
//!
//! Two layers, each with exactly one encode/decode pair:
//!
//! - **Document**: `[Component]` <-> UTF-8 JSON bytes (pretty-printed,
//!   two-space indent)
//! - **Transport**: bytes <-> base64 text, as carried in the `content`
//!   field of the GitHub Contents API
//!
//! Every read and write path goes through these functions. The transport
//! layer works on raw bytes and never reinterprets them as text, so
//! multi-byte UTF-8 survives the round trip unchanged.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::models::Component;

/// Errors raised while decoding or encoding an inventory document
#[derive(Error, Debug)]
pub enum CodecError {
    /// Transport text is not valid base64
    #[error("Invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Document bytes are not valid UTF-8
    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Document is not well-formed JSON
    #[error("Document is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// Top-level value is something other than an array of records
    #[error("Document must be a JSON array of components, found {found}")]
    NotACollection { found: &'static str },

    /// A record failed schema validation
    #[error("Component at index {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// Serializing the collection failed
    #[error("Failed to encode components: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Serialize a collection to document bytes
pub fn encode_collection(components: &[Component]) -> CodecResult<Vec<u8>> {
    serde_json::to_vec_pretty(components).map_err(CodecError::Encode)
}

/// Parse document bytes into a collection.
///
/// Records are validated one at a time so a bad entry is reported by
/// position instead of failing with a generic parse error. Records stored
/// without an id get [`Component::derived_id`], so decoding the same
/// document twice yields the same ids.
pub fn decode_collection(bytes: &[u8]) -> CodecResult<Vec<Component>> {
    let text = std::str::from_utf8(bytes)?;
    let value: serde_json::Value = serde_json::from_str(text).map_err(CodecError::Json)?;

    let serde_json::Value::Array(items) = value else {
        return Err(CodecError::NotACollection {
            found: json_kind(&value),
        });
    };

    let mut components: Vec<Component> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| CodecError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect::<CodecResult<_>>()?;

    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    for component in components.iter_mut().filter(|c| c.id.is_nil()) {
        let occurrence = seen
            .entry((component.name.clone(), component.part_number.clone()))
            .or_insert(0);
        component.id = Component::derived_id(&component.name, &component.part_number, *occurrence);
        *occurrence += 1;
    }

    Ok(components)
}

/// Encode bytes for transport
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode transport text back to bytes.
///
/// GitHub wraps base64 content at 60 columns; ASCII whitespace is dropped
/// before decoding.
pub fn from_base64(text: &str) -> CodecResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
