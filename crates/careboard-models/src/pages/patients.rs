//! Patients page: roster normalization.

use careboard_core::Params;
use serde_json::{Map, Value, json};

use super::{ensure_array, present_or, truthy_or, truthy_or_null};
use crate::contract::{ModelContract, nullable_string};

pub fn contract() -> ModelContract {
    ModelContract::new()
        .require("patients")
        .validate("patients", Value::is_array)
        .validate("lastSyncedAt", nullable_string)
}

pub fn transform(raw: Value, _params: &Params) -> Value {
    let empty = Map::new();
    let payload = raw.as_object().unwrap_or(&empty);
    let patients: Vec<Value> = ensure_array(payload.get("patients"))
        .iter()
        .enumerate()
        .map(|(index, patient)| normalize_patient(patient, index))
        .collect();

    json!({
        "patients": patients,
        "lastSyncedAt": truthy_or_null(payload, "lastSyncedAt"),
    })
}

fn normalize_patient(patient: &Value, index: usize) -> Value {
    let empty = Map::new();
    let p = patient.as_object().unwrap_or(&empty);

    // Derived from the raw field, not the defaulted one: a record with no
    // insurance at all reads as "Active", only an explicit "None" is
    // self-pay.
    let derived_insurance_status = if p.get("insurance") == Some(&json!("None")) {
        json!("Self-Pay")
    } else {
        json!("Active")
    };

    json!({
        "iid": present_or(p, "iid", json!(format!("P-{}", 1000 + index))),
        "cin": present_or(p, "cin", json!("UNKNOWN")),
        "name": present_or(p, "name", json!("Unknown Patient")),
        "sex": if p.get("sex") == Some(&json!("F")) { "F" } else { "M" },
        "birthDate": truthy_or(p, "birthDate", truthy_or(p, "birth", json!("Unknown"))),
        "bloodGroup": truthy_or_null(p, "bloodGroup"),
        "phone": truthy_or_null(p, "phone"),
        "email": truthy_or_null(p, "email"),
        "city": truthy_or(p, "city", json!("N/A")),
        "insurance": truthy_or(p, "insurance", json!("None")),
        "status": truthy_or(p, "status", json!("Outpatient")),
        "insuranceStatus": truthy_or(p, "insuranceStatus", derived_insurance_status),
        "policyNumber": truthy_or_null(p, "policyNumber"),
        "nextVisit": normalize_next_visit(p.get("nextVisit")),
    })
}

/// Upcoming-visit block: an object normalizes field by field, anything
/// else collapses to `null`.
fn normalize_next_visit(value: Option<&Value>) -> Value {
    let Some(visit) = value.and_then(Value::as_object) else {
        return Value::Null;
    };
    json!({
        "date": visit.get("date").and_then(Value::as_str),
        "time": visit.get("time").and_then(Value::as_str),
        "hospital": truthy_or(visit, "hospital", json!("To be assigned")),
        "department": truthy_or_null(visit, "department"),
        "reason": truthy_or_null(visit, "reason"),
    })
}
