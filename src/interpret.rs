//! Lenient extraction of the JSON payload embedded in a model reply.
//!
//! Models are asked for a JSON object but routinely wrap it in prose or
//! markdown fences. The scanner takes the first `{`, follows brace depth
//! (ignoring braces inside string literals) and cuts at the matching `}`.
//! Only that first candidate is decoded.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// A decoded payload: every field is independently present or absent.
pub type Payload = Map<String, Value>;

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("no JSON object found in reply")]
    NoPayload,
    #[error("malformed JSON in reply: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("reply payload is not a JSON object")]
    NotAnObject,
}

/// Locate the first balanced `{...}` region in `reply`
pub fn find_payload(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in reply[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    // Unbalanced: the reply was cut off or the nesting is broken
    None
}

/// Extract and decode the payload, reporting why it failed
pub fn try_extract_payload(reply: &str) -> Result<Payload, InterpretError> {
    let candidate = find_payload(reply).ok_or(InterpretError::NoPayload)?;
    match serde_json::from_str::<Value>(candidate)? {
        Value::Object(map) => Ok(map),
        _ => Err(InterpretError::NotAnObject),
    }
}

/// Extract the payload, falling back to an empty record on any failure
pub fn extract_payload(reply: &str) -> Payload {
    try_extract_payload(reply).unwrap_or_default()
}

/// Read a single field, treating a wrong-typed value as absent
pub fn field<T: DeserializeOwned>(payload: &Payload, key: &str) -> Option<T> {
    payload
        .get(key)
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Read an array field item by item, skipping entries that fail to deserialize
pub fn items<T: DeserializeOwned>(payload: &Payload, key: &str) -> Option<Vec<T>> {
    match payload.get(key)? {
        Value::Array(arr) => Some(
            arr.iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect(),
        ),
        _ => None,
    }
}
