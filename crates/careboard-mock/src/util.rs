//! Parameter and body inspection shared by the mock resolvers.

use careboard_backend::BackendError;
use serde_json::{Map, Value};

/// Rejects a body that is not a JSON object.
pub(crate) fn body_object(body: Option<Value>) -> Result<Map<String, Value>, BackendError> {
    match body {
        Some(Value::Object(map)) => Ok(map),
        Some(Value::Null) | None => Ok(Map::new()),
        Some(_) => Err(BackendError::invalid_payload("Request body must be an object")),
    }
}

/// Required-field check where blank strings, nulls, zeroes and absent
/// keys all fail.
pub(crate) fn require_text(body: &Map<String, Value>, fields: &[&str]) -> Result<(), BackendError> {
    require_fields(body, fields, |value| match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

/// Required-field check where numeric zero is an acceptable value.
pub(crate) fn require_present(
    body: &Map<String, Value>,
    fields: &[&str],
) -> Result<(), BackendError> {
    require_fields(body, fields, |value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn require_fields(
    body: &Map<String, Value>,
    fields: &[&str],
    accepts: impl Fn(&Value) -> bool,
) -> Result<(), BackendError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|field| !body.get(**field).is_some_and(&accepts))
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(BackendError::invalid_payload(format!(
            "Missing fields: {}",
            missing.join(", ")
        )))
    }
}

pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose numeric coercion with a zero fallback.
pub(crate) fn number_or_zero(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
