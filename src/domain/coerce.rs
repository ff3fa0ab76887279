//! State string coercion.
//!
//! The recorder stores every state as text. These helpers decide how a
//! state string maps onto a number and never fail: anything that cannot be
//! interpreted becomes a missing value (`None` or `NaN`).

use serde_json::Value;

/// Returns true if `state` parses as a floating point literal.
#[must_use]
pub fn is_numeric(state: &str) -> bool {
    state.trim().parse::<f64>().is_ok()
}

/// Parse a numeric state, treating non-finite literals as missing.
#[must_use]
pub fn parse_numeric(state: &str) -> Option<f64> {
    state
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Encode a binary sensor state: `on` is 1, `off` is 0, anything else NaN.
#[must_use]
pub fn binary_encode(state: Option<&str>) -> f64 {
    match state {
        Some("on") => 1.0,
        Some("off") => 0.0,
        _ => f64::NAN,
    }
}

/// Look up a string attribute, falling back to `default`.
///
/// Non-string values are rendered with their JSON representation so a
/// numeric attribute still reads sensibly.
#[must_use]
pub fn extract_attribute(attributes: Option<&Value>, key: &str, default: &str) -> String {
    let Some(Value::Object(map)) = attributes else {
        return default.to_string();
    };

    match map.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Parse a raw attribute blob as stored by the recorder.
///
/// Returns `None` for empty or malformed blobs.
#[must_use]
pub fn parse_attributes(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(Value::is_object)
}
