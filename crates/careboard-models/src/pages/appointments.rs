//! Appointments page: schedule normalization.
//!
//! Upstream systems disagree on where the clinical-activity id lives, so
//! `resolve_caid` walks a candidate chain before falling back to a
//! position-derived id.

use careboard_core::Params;
use serde_json::{Map, Value, json};

use super::{ensure_array, present_or, today_iso, truthy_or, truthy_or_null};
use crate::contract::{ModelContract, nullable_string};

pub fn contract() -> ModelContract {
    ModelContract::new()
        .require("appointments")
        .validate("appointments", Value::is_array)
        .validate("lastSyncedAt", nullable_string)
}

pub fn transform(raw: Value, _params: &Params) -> Value {
    let empty = Map::new();
    let payload = raw.as_object().unwrap_or(&empty);
    let appointments: Vec<Value> = ensure_array(payload.get("appointments"))
        .iter()
        .enumerate()
        .map(|(index, appointment)| normalize_appointment(appointment, index))
        .collect();

    json!({
        "appointments": appointments,
        "lastSyncedAt": truthy_or_null(payload, "lastSyncedAt"),
    })
}

fn normalize_appointment(appointment: &Value, index: usize) -> Value {
    let empty = Map::new();
    let a = appointment.as_object().unwrap_or(&empty);
    json!({
        "id": present_or(a, "id", json!(format!("APT-{}", 5000 + index))),
        "caid": resolve_caid(a, index),
        "date": present_or(a, "date", json!(today_iso())),
        "time": present_or(a, "time", json!("09:00")),
        "hospital": present_or(a, "hospital", json!("Unknown Hospital")),
        "department": present_or(a, "department", json!("General")),
        "patient": truthy_or(a, "patient", truthy_or(a, "patientName", json!(format!("Patient {index}")))),
        "staff": truthy_or(a, "staff", truthy_or(a, "doctor", json!(format!("Dr. Staff {index}")))),
        "reason": truthy_or(a, "reason", json!("Consultation")),
        "status": truthy_or(a, "status", json!("Scheduled")),
    })
}

/// First numeric candidate among the known id spellings, else `5000 + index`.
fn resolve_caid(appointment: &Map<String, Value>, index: usize) -> Value {
    let activity = appointment.get("activity").and_then(Value::as_object);
    let candidates = [
        appointment.get("caid"),
        appointment.get("caId"),
        appointment.get("activityId"),
        activity.and_then(|act| act.get("caid")),
        activity.and_then(|act| act.get("id")),
        activity.and_then(|act| act.get("activityId")),
        appointment.get("id"),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(numeric) = parse_numeric(candidate) {
            return numeric;
        }
    }
    json!(5000 + index)
}

/// Tolerant numeric parse: numbers pass through, numeric strings parse,
/// otherwise the first run of digits wins (so `"APT-5093"` yields `5093`).
fn parse_numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => Some(Value::Number(n.clone())),
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Ok(int) = trimmed.parse::<i64>() {
                return Some(json!(int));
            }
            if let Ok(float) = trimmed.parse::<f64>()
                && float.is_finite()
            {
                return Some(json!(float));
            }
            let digits: String = trimmed
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<i64>().ok().map(|int| json!(int))
        }
        _ => None,
    }
}
