//! Staff page: roster normalization.

use careboard_core::Params;
use serde_json::{Map, Value, json};

use super::{ensure_array, present_or, truthy_or, truthy_or_null};
use crate::contract::{ModelContract, nullable_string};

pub fn contract() -> ModelContract {
    ModelContract::new()
        .require("staff")
        .validate("staff", Value::is_array)
        .validate("lastSyncedAt", nullable_string)
}

pub fn transform(raw: Value, _params: &Params) -> Value {
    let empty = Map::new();
    let payload = raw.as_object().unwrap_or(&empty);
    let staff: Vec<Value> = ensure_array(payload.get("staff"))
        .iter()
        .enumerate()
        .map(|(index, member)| normalize_member(member, index))
        .collect();

    json!({
        "staff": staff,
        "lastSyncedAt": truthy_or_null(payload, "lastSyncedAt"),
    })
}

fn normalize_member(member: &Value, index: usize) -> Value {
    let empty = Map::new();
    let m = member.as_object().unwrap_or(&empty);
    json!({
        "id": present_or(m, "id", json!(format!("S-{}", 200 + index))),
        "name": present_or(m, "name", json!("Unknown Staff")),
        "role": present_or(m, "role", json!("General")),
        "departments": ensure_array(m.get("departments")),
        "hospitals": ensure_array(m.get("hospitals")),
        "status": truthy_or(m, "status", json!("Active")),
    })
}
