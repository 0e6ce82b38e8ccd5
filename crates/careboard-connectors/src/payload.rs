//! Small payload inspection helpers shared by the domain connectors.
//!
//! The connectors apply three levels of "required" depending on the
//! domain contract: a field may need to carry visible text, merely be a
//! non-null value, or simply be present at all.

use serde_json::{Map, Value, json};

use crate::error::{ConnectorError, Result};

/// Borrows the payload as a JSON object or rejects the mutation.
pub(crate) fn as_object<'a>(payload: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    payload
        .as_object()
        .ok_or_else(|| ConnectorError::invalid_field(format!("{what} payload must be an object")))
}

/// A field is blank when it is absent, null, `false`, zero, or a string
/// with no visible characters.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// A field is unset when it is absent, null, or a blank string. Numeric
/// zero counts as set; stock quantities legitimately start at zero.
pub(crate) fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Fields that fail `is_blank`, in declaration order.
pub(crate) fn blank_fields(body: &Map<String, Value>, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| is_blank(body.get(**field)))
        .map(|field| (*field).to_string())
        .collect()
}

/// Fields that fail `is_unset`, in declaration order.
pub(crate) fn unset_fields(body: &Map<String, Value>, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| is_unset(body.get(**field)))
        .map(|field| (*field).to_string())
        .collect()
}

/// Loose numeric coercion: numbers pass through, numeric strings parse,
/// everything else is rejected.
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Renders a coerced number back into JSON, preferring an integer
/// representation when the value has no fractional part.
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// Trims a string field in place when it carries one.
pub(crate) fn trim_string_field(body: &mut Map<String, Value>, field: &str) {
    if let Some(Value::String(s)) = body.get(field) {
        let trimmed = s.trim().to_string();
        body.insert(field.to_string(), Value::String(trimmed));
    }
}
