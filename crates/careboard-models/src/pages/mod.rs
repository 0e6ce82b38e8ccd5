//! Per-page normalization: raw backend payloads in, fully-defaulted view
//! models out.
//!
//! Upstream payloads are tolerated in heterogeneous shapes (missing fields,
//! scalar-or-object nesting, stringly-typed numbers); every transform here
//! produces one canonical shape so downstream consumers never need
//! null-guards. All transforms are pure.

pub mod appointments;
pub mod billing;
pub mod medications;
pub mod overview;
pub mod patients;
pub mod staff;

use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Loose upstream presence check: null, false, zero and the empty string
/// all count as unset, mirroring the fallback rules of the backend API.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `obj[key]` when present and non-null, else `default`.
pub(crate) fn present_or(obj: &Map<String, Value>, key: &str, default: Value) -> Value {
    match obj.get(key) {
        Some(value) if !value.is_null() => value.clone(),
        _ => default,
    }
}

/// `obj[key]` when loosely set, else `default`.
pub(crate) fn truthy_or(obj: &Map<String, Value>, key: &str, default: Value) -> Value {
    match obj.get(key) {
        Some(value) if truthy(value) => value.clone(),
        _ => default,
    }
}

/// `obj[key]` when loosely set, else `null`.
pub(crate) fn truthy_or_null(obj: &Map<String, Value>, key: &str) -> Value {
    truthy_or(obj, key, Value::Null)
}

/// `obj[key]` when it is a JSON number, else `0`.
pub(crate) fn number_or_zero(obj: &Map<String, Value>, key: &str) -> Value {
    match obj.get(key) {
        Some(value @ Value::Number(_)) => value.clone(),
        _ => json!(0),
    }
}

/// `obj[key]` when it is a JSON number, else `null`.
pub(crate) fn number_or_null(obj: &Map<String, Value>, key: &str) -> Value {
    match obj.get(key) {
        Some(value @ Value::Number(_)) => value.clone(),
        _ => Value::Null,
    }
}

/// The array at `value`, or an empty one for any other shape.
pub(crate) fn ensure_array(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// The object at `obj[key]`, or `None` for any other shape.
pub(crate) fn object_at<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

/// Best-effort numeric coercion of a loosely-typed upstream value.
///
/// `None` stands for "not a number"; an absent value coerces to `None`
/// while an explicit `null` coerces to zero, matching the backend's own
/// coercion rules.
pub(crate) fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Current instant as an RFC 3339 string.
pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Current UTC day as `YYYY-MM-DD`.
pub(crate) fn today_iso() -> String {
    OffsetDateTime::now_utc().date().to_string()
}
