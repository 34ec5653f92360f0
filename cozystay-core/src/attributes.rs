//! Free-form attributes serialized next to a record's typed fields.
use serde_json::{Map, Value};

/// Drops keys owned by typed fields so a record never serializes a key twice.
pub fn strip_reserved(mut details: Map<String, Value>, reserved: &[&str]) -> Map<String, Value> {
    for key in reserved {
        if details.remove(*key).is_some() {
            tracing::debug!(key, "dropped reserved attribute");
        }
    }
    details
}

/// Stored payloads that are not JSON objects carry no attributes.
pub fn from_stored(details: Value, reserved: &[&str]) -> Map<String, Value> {
    match details {
        Value::Object(map) => strip_reserved(map, reserved),
        _ => Map::new(),
    }
}
