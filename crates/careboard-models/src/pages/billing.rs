//! Billing page: KPI, rollup and expense normalization.
//!
//! The expense feed is the most shape-tolerant part of the API: hospital,
//! department, patient, staff and insurance blocks arrive either as a bare
//! label or as a full object. Each such field is modeled as an untagged
//! union and funneled through exactly one normalizer.

use careboard_core::Params;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{
    coerce_number, ensure_array, now_rfc3339, number_or_null, number_or_zero, present_or,
    truthy, truthy_or, truthy_or_null,
};
use crate::contract::ModelContract;

pub fn contract() -> ModelContract {
    ModelContract::new()
        .require("kpis")
        .require("insuranceSplit")
        .require("hospitalRollup")
        .require("departmentSummary")
        .require("recentExpenses")
        .require("medicationUtilization")
        .require("metadata")
        .validate("kpis", Value::is_array)
        .validate("insuranceSplit", Value::is_array)
        .validate("hospitalRollup", Value::is_array)
        .validate("departmentSummary", Value::is_array)
        .validate("recentExpenses", Value::is_array)
        .validate("medicationUtilization", Value::is_array)
        .validate("metadata", Value::is_object)
}

pub fn transform(raw: Value, _params: &Params) -> Value {
    let empty = Map::new();
    let payload = raw.as_object().unwrap_or(&empty);

    let map_each = |key: &str, f: fn(&Value, usize) -> Value| -> Vec<Value> {
        ensure_array(payload.get(key))
            .iter()
            .enumerate()
            .map(|(index, entry)| f(entry, index))
            .collect()
    };

    json!({
        "kpis": map_each("kpis", normalize_kpi),
        "insuranceSplit": map_each("insuranceSplit", normalize_insurance_slice),
        "hospitalRollup": map_each("hospitalRollup", normalize_hospital_rollup),
        "departmentSummary": map_each("departmentSummary", normalize_department_summary),
        "recentExpenses": map_each("recentExpenses", normalize_expense),
        "medicationUtilization": map_each("medicationUtilization", normalize_utilization),
        "metadata": normalize_metadata(payload.get("metadata")),
    })
}

/// Scalar-or-struct field as it arrives from upstream.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Block(Map<String, Value>),
    Scalar(Value),
}

impl RawField {
    fn of(value: Option<&Value>) -> Option<Self> {
        value.and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

fn normalize_kpi(entry: &Value, index: usize) -> Value {
    let empty = Map::new();
    let e = entry.as_object().unwrap_or(&empty);

    let value = match e.get("value") {
        Some(v @ Value::Number(_)) => v.clone(),
        other => match coerce_number(other) {
            Some(n) if n != 0.0 => json!(n),
            _ => json!(0),
        },
    };

    json!({
        "key": truthy_or(e, "key", json!(format!("kpi-{index}"))),
        "title": truthy_or(e, "title", json!(format!("Metric {}", index + 1))),
        "value": value,
        "unit": truthy_or(e, "unit", json!("MAD")),
        "iconKey": truthy_or(e, "iconKey", truthy_or(e, "icon", json!("CreditCard"))),
        "subtext": truthy_or_null(e, "subtext"),
        "trend": normalize_trend(e.get("trend")),
    })
}

/// Trend block: direction snaps to "up"/"down"/null, the magnitude coerces
/// to a number; an empty or non-object trend collapses to null.
fn normalize_trend(value: Option<&Value>) -> Value {
    let Some(trend) = value.and_then(Value::as_object) else {
        return Value::Null;
    };
    let direction = match trend.get("direction").and_then(Value::as_str) {
        Some("down") => json!("down"),
        Some("up") => json!("up"),
        _ => Value::Null,
    };
    let magnitude = match trend.get("value") {
        Some(v @ Value::Number(_)) => Some(v.clone()),
        other => coerce_number(other).map(|n| json!(n)),
    };

    if direction.is_null() && magnitude.is_none() {
        return Value::Null;
    }
    json!({
        "direction": direction,
        "value": magnitude.unwrap_or(Value::Null),
    })
}

fn normalize_insurance_slice(entry: &Value, index: usize) -> Value {
    let empty = Map::new();
    let e = entry.as_object().unwrap_or(&empty);

    let activities = match e.get("activities") {
        Some(v @ Value::Number(_)) => v.clone(),
        _ => match e.get("claims") {
            Some(claims) if truthy(claims) => claims.clone(),
            _ => json!(0),
        },
    };

    json!({
        "insId": present_or(e, "insId", Value::Null),
        "type": truthy_or(e, "type", json!(format!("Bucket {}", index + 1))),
        "amount": number_or_zero(e, "amount"),
        "activities": activities,
        "share": number_or_null(e, "share"),
    })
}

fn normalize_hospital_rollup(entry: &Value, index: usize) -> Value {
    let empty = Map::new();
    let e = entry.as_object().unwrap_or(&empty);
    json!({
        "hid": present_or(e, "hid", json!(index)),
        "name": truthy_or(e, "name", json!(format!("Hospital {}", index + 1))),
        "region": truthy_or(e, "region", json!("Unknown Region")),
        "total": number_or_zero(e, "total"),
        "activities": number_or_zero(e, "activities"),
        "insuredShare": number_or_null(e, "insuredShare"),
        "avgExpense": number_or_null(e, "avgExpense"),
    })
}

fn normalize_department_summary(entry: &Value, index: usize) -> Value {
    let empty = Map::new();
    let e = entry.as_object().unwrap_or(&empty);
    json!({
        "depId": present_or(e, "depId", json!(index)),
        "hospital": truthy_or(e, "hospital", json!("Unknown Hospital")),
        "department": truthy_or(e, "department", json!(format!("Department {}", index + 1))),
        "specialty": truthy_or(e, "specialty", json!("General")),
        "total": number_or_zero(e, "total"),
        "activities": number_or_zero(e, "activities"),
        "avgExpense": number_or_null(e, "avgExpense"),
    })
}

fn normalize_expense(entry: &Value, index: usize) -> Value {
    let empty = Map::new();
    let e = entry.as_object().unwrap_or(&empty);

    json!({
        "expId": present_or(e, "expId", present_or(e, "id", json!(format!("EXP-{index}")))),
        "caid": present_or(e, "caid", Value::Null),
        "activityDate": truthy_or(e, "activityDate", truthy_or(e, "date", json!(now_rfc3339()))),
        "hospital": normalize_org(e.get("hospital"), "Unknown Hospital", "hid"),
        "department": normalize_org(e.get("department"), "General", "depId"),
        "patient": normalize_person(e.get("patient"), &format!("Patient {}", index + 1), "iid"),
        "staff": normalize_person(e.get("staff"), "Unknown Staff", "staffId"),
        "insurance": normalize_insurance(e.get("insurance")),
        "total": number_or_zero(e, "total"),
        "prescription": normalize_prescription(e.get("prescription")),
    })
}

fn normalize_org(field: Option<&Value>, fallback: &str, id_key: &str) -> Value {
    match RawField::of(field) {
        Some(RawField::Block(block)) => json!({
            id_key: present_or(&block, id_key, present_or(&block, "id", Value::Null)),
            "name": truthy_or(&block, "name", json!(fallback)),
            "region": truthy_or(
                &block,
                "region",
                truthy_or(&block, "location", truthy_or_null(&block, "regionName")),
            ),
        }),
        Some(RawField::Scalar(scalar)) if truthy(&scalar) => json!({
            id_key: Value::Null,
            "name": scalar,
            "region": Value::Null,
        }),
        _ => json!({ id_key: Value::Null, "name": fallback, "region": Value::Null }),
    }
}

fn normalize_person(field: Option<&Value>, fallback: &str, id_key: &str) -> Value {
    match RawField::of(field) {
        Some(RawField::Block(block)) => json!({
            id_key: present_or(&block, id_key, present_or(&block, "id", Value::Null)),
            "fullName": truthy_or(&block, "fullName", truthy_or(&block, "name", json!(fallback))),
        }),
        Some(RawField::Scalar(scalar)) if truthy(&scalar) => json!({
            id_key: Value::Null,
            "fullName": scalar,
        }),
        _ => json!({ id_key: Value::Null, "fullName": fallback }),
    }
}

fn normalize_insurance(field: Option<&Value>) -> Value {
    match RawField::of(field) {
        Some(RawField::Block(block)) => json!({
            "insId": present_or(&block, "insId", present_or(&block, "id", Value::Null)),
            "type": truthy_or(&block, "type", truthy_or(&block, "name", json!("Self-Pay"))),
        }),
        Some(RawField::Scalar(scalar)) if truthy(&scalar) => json!({
            "insId": Value::Null,
            "type": scalar,
        }),
        _ => json!({ "insId": Value::Null, "type": "Self-Pay" }),
    }
}

fn normalize_prescription(field: Option<&Value>) -> Value {
    let Some(p) = field.and_then(Value::as_object) else {
        return Value::Null;
    };
    let medications: Vec<Value> = ensure_array(p.get("medications"))
        .iter()
        .enumerate()
        .map(|(index, med)| {
            let empty = Map::new();
            let m = med.as_object().unwrap_or(&empty);
            json!({
                "mid": present_or(m, "mid", present_or(m, "id", json!(index))),
                "name": truthy_or(m, "name", json!(format!("Medication {}", index + 1))),
                "dosage": truthy_or_null(m, "dosage"),
                "duration": truthy_or_null(m, "duration"),
                "therapeuticClass": truthy_or(m, "therapeuticClass", truthy_or_null(m, "class")),
            })
        })
        .collect();

    json!({
        "pid": present_or(p, "pid", present_or(p, "id", Value::Null)),
        "medications": medications,
    })
}

fn normalize_utilization(entry: &Value, index: usize) -> Value {
    let empty = Map::new();
    let e = entry.as_object().unwrap_or(&empty);
    json!({
        "mid": present_or(e, "mid", present_or(e, "id", json!(index))),
        "name": truthy_or(e, "name", json!(format!("Medication {}", index + 1))),
        "therapeuticClass": truthy_or(e, "therapeuticClass", truthy_or(e, "class", json!("General"))),
        "prescriptions": number_or_zero(e, "prescriptions"),
        "share": number_or_null(e, "share"),
    })
}

fn normalize_metadata(value: Option<&Value>) -> Value {
    let empty = Map::new();
    let metadata = value.and_then(Value::as_object).unwrap_or(&empty);
    let filters = metadata
        .get("filters")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let last_synced_at = match metadata.get("lastSyncedAt") {
        Some(v @ Value::String(s)) if !s.is_empty() => v.clone(),
        _ => Value::Null,
    };
    json!({ "filters": filters, "lastSyncedAt": last_synced_at })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_satisfies_contract() {
        let model = transform(json!({}), &Params::new());
        assert!(contract().check("Billing", &model).is_ok());
        assert_eq!(model["metadata"], json!({"filters": {}, "lastSyncedAt": null}));
    }

    #[test]
    fn test_expense_blocks_accept_bare_labels() {
        let model = transform(
            json!({"recentExpenses": [{
                "expId": 1048,
                "hospital": "Tangier Regional",
                "patient": "Salma Outmane",
                "insurance": "CNSS",
            }]}),
            &Params::new(),
        );
        let expense = &model["recentExpenses"][0];
        assert_eq!(
            expense["hospital"],
            json!({"hid": null, "name": "Tangier Regional", "region": null})
        );
        assert_eq!(
            expense["patient"],
            json!({"iid": null, "fullName": "Salma Outmane"})
        );
        assert_eq!(expense["insurance"], json!({"insId": null, "type": "CNSS"}));
    }

    #[test]
    fn test_expense_blocks_accept_full_objects() {
        let model = transform(
            json!({"recentExpenses": [{
                "hospital": {"hid": 4, "name": "Rabat University Hospital", "location": "Rabat"},
                "staff": {"staffId": 221, "fullName": "Dr. Selma Idrissi"},
                "insurance": {"insId": 2, "type": "CNSS"},
            }]}),
            &Params::new(),
        );
        let expense = &model["recentExpenses"][0];
        assert_eq!(
            expense["hospital"],
            json!({"hid": 4, "name": "Rabat University Hospital", "region": "Rabat"})
        );
        assert_eq!(
            expense["staff"],
            json!({"staffId": 221, "fullName": "Dr. Selma Idrissi"})
        );
        assert_eq!(expense["insurance"], json!({"insId": 2, "type": "CNSS"}));
    }

    #[test]
    fn test_missing_insurance_defaults_to_self_pay() {
        let model = transform(json!({"recentExpenses": [{}]}), &Params::new());
        assert_eq!(
            model["recentExpenses"][0]["insurance"],
            json!({"insId": null, "type": "Self-Pay"})
        );
    }

    #[test]
    fn test_prescription_object_or_null() {
        let model = transform(
            json!({"recentExpenses": [
                {"prescription": null},
                {"prescription": {"pid": 9901, "medications": [{"mid": 120, "class": "Statin"}]}},
            ]}),
            &Params::new(),
        );
        assert_eq!(model["recentExpenses"][0]["prescription"], json!(null));
        assert_eq!(
            model["recentExpenses"][1]["prescription"],
            json!({
                "pid": 9901,
                "medications": [{
                    "mid": 120,
                    "name": "Medication 1",
                    "dosage": null,
                    "duration": null,
                    "therapeuticClass": "Statin",
                }],
            })
        );
    }

    #[test]
    fn test_trend_normalization() {
        let model = transform(
            json!({"kpis": [
                {"trend": {"direction": "up", "value": 0.084}},
                {"trend": {"direction": "sideways", "value": "0.5"}},
                {"trend": {"direction": "sideways", "value": "garbage"}},
                {"trend": "up"},
                {},
            ]}),
            &Params::new(),
        );
        let kpis = model["kpis"].as_array().unwrap();
        assert_eq!(kpis[0]["trend"], json!({"direction": "up", "value": 0.084}));
        assert_eq!(kpis[1]["trend"], json!({"direction": null, "value": 0.5}));
        assert_eq!(kpis[2]["trend"], json!(null));
        assert_eq!(kpis[3]["trend"], json!(null));
        assert_eq!(kpis[4]["trend"], json!(null));
    }

    #[test]
    fn test_kpi_defaults() {
        let model = transform(json!({"kpis": [{"icon": "ShieldCheck"}]}), &Params::new());
        let kpi = &model["kpis"][0];
        assert_eq!(kpi["key"], json!("kpi-0"));
        assert_eq!(kpi["title"], json!("Metric 1"));
        assert_eq!(kpi["value"], json!(0));
        assert_eq!(kpi["unit"], json!("MAD"));
        assert_eq!(kpi["iconKey"], json!("ShieldCheck"));
    }

    #[test]
    fn test_insurance_slice_claims_fallback() {
        let model = transform(
            json!({"insuranceSplit": [{"type": "CNOPS", "claims": 138}]}),
            &Params::new(),
        );
        assert_eq!(model["insuranceSplit"][0]["activities"], json!(138));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let raw = json!({
            "kpis": [{"key": "avgExpense", "value": 3050, "trend": {"direction": "down", "value": 0.012}}],
            "hospitalRollup": [{"hid": 1, "name": "Casablanca Central", "total": 260000}],
            "metadata": {"filters": {"daysBack": 30}, "lastSyncedAt": "2026-08-29T08:00:00Z"},
        });
        assert_eq!(
            transform(raw.clone(), &Params::new()),
            transform(raw, &Params::new())
        );
    }
}
