//! Flattening of upstream error payloads into one readable line.
//!
//! Upstream error bodies come in many shapes: plain text, a JSON object,
//! a JSON string holding another JSON object, or an HTML error page.
//! [`normalize_error_message`] walks an ordered list of fallbacks over a
//! [`serde_json::Value`] and always produces a string.

use serde_json::{Map, Value};

/// Extracts a human-readable message from an arbitrary error payload.
///
/// Never fails. Order of precedence:
/// 1. A JSON-shaped string is parsed; if parsing fails the literal string
///    is returned. Any other string is returned as is.
/// 2. An object's `error` field: a string is parsed again (double-encoded
///    errors), an object yields its `message` or `status`.
/// 3. An object's string `message` or `statusText`.
/// 4. The JSON rendering of the value (`null` renders as empty).
pub fn normalize_error_message(raw: &Value) -> String {
    match raw {
        Value::String(text) => from_text(text),
        Value::Null => String::new(),
        Value::Object(map) => from_object(map),
        other => other.to_string(),
    }
}

/// Convenience wrapper for a plain text payload.
pub fn normalize_error_text(raw: &str) -> String {
    from_text(raw)
}

fn from_text(text: &str) -> String {
    if !looks_like_json(text) {
        return text.to_string();
    }
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(parsed) => normalize_error_message(&parsed),
        Err(_) => text.to_string(),
    }
}

fn from_object(map: &Map<String, Value>) -> String {
    match map.get("error") {
        Some(Value::String(inner)) => {
            return match serde_json::from_str::<Value>(inner.trim()) {
                Ok(Value::Null) | Err(_) => inner.clone(),
                Ok(parsed) => normalize_error_message(&parsed),
            };
        }
        Some(Value::Object(inner)) => {
            return field_text(inner, "message")
                .or_else(|| field_text(inner, "status"))
                .unwrap_or_else(|| Value::Object(inner.clone()).to_string());
        }
        _ => {}
    }

    if let Some(Value::String(message)) = map.get("message") {
        return message.clone();
    }
    if let Some(Value::String(status_text)) = map.get("statusText") {
        return status_text.clone();
    }

    Value::Object(map.clone()).to_string()
}

/// A string or number field rendered as text.
fn field_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Whether a normalized message reports an overloaded upstream.
pub fn mentions_overload(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("overloaded") || lower.contains("unavailable")
}

// ============================================================================
// Tests
// ============================================================================
