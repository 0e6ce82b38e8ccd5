//! Medications page: stock, pricing and replenishment normalization plus
//! derived stock aggregates.

use careboard_core::Params;
use serde_json::{Map, Value, json};

use super::{
    ensure_array, now_rfc3339, number_or_zero, present_or, truthy_or, truthy_or_null,
};
use crate::contract::ModelContract;

pub fn contract() -> ModelContract {
    ModelContract::new()
        .require("lowStock")
        .require("pricingSummary")
        .require("priceSeries")
        .require("replenishmentTrend")
        .require("aggregates")
        .validate("lowStock", Value::is_array)
        .validate("pricingSummary", Value::is_array)
        .validate("priceSeries", Value::is_array)
        .validate("replenishmentTrend", Value::is_array)
        .validate("aggregates", Value::is_object)
}

pub fn transform(raw: Value, _params: &Params) -> Value {
    let empty = Map::new();
    let payload = raw.as_object().unwrap_or(&empty);

    let low_stock: Vec<Value> = ensure_array(payload.get("lowStock"))
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_low_stock(record, index))
        .collect();
    let pricing_summary: Vec<Value> = ensure_array(payload.get("pricingSummary"))
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_pricing(record, index))
        .collect();
    let price_series: Vec<Value> = ensure_array(payload.get("priceSeries"))
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_price_point(record, index))
        .collect();
    let replenishment_trend: Vec<Value> = ensure_array(payload.get("replenishmentTrend"))
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_replenishment(record, index))
        .collect();
    let aggregates = compute_aggregates(&low_stock, payload.get("aggregates"));

    json!({
        "lowStock": low_stock,
        "pricingSummary": pricing_summary,
        "priceSeries": price_series,
        "replenishmentTrend": replenishment_trend,
        "aggregates": aggregates,
        "lastSyncedAt": truthy_or_null(payload, "lastSyncedAt"),
    })
}

fn normalize_low_stock(record: &Value, index: usize) -> Value {
    let empty = Map::new();
    let r = record.as_object().unwrap_or(&empty);
    json!({
        "id": present_or(r, "id", json!(format!("MED-{index}"))),
        "name": present_or(r, "name", json!("Unknown Medication")),
        "hospital": present_or(r, "hospital", json!("N/A")),
        "qty": number_or_zero(r, "qty"),
        "reorderLevel": number_or_zero(r, "reorderLevel"),
        "unit": truthy_or(r, "unit", json!("units")),
        "class": truthy_or(r, "class", json!("General")),
    })
}

fn normalize_pricing(record: &Value, index: usize) -> Value {
    let empty = Map::new();
    let r = record.as_object().unwrap_or(&empty);
    json!({
        "hospital": present_or(r, "hospital", json!("N/A")),
        "medication": present_or(r, "medication", json!(format!("Medication {index}"))),
        "avg": number_or_zero(r, "avg"),
        "min": number_or_zero(r, "min"),
        "max": number_or_zero(r, "max"),
        "updatedAt": truthy_or(r, "updatedAt", json!(now_rfc3339())),
    })
}

fn normalize_price_point(record: &Value, index: usize) -> Value {
    let empty = Map::new();
    let r = record.as_object().unwrap_or(&empty);
    json!({
        "hospital": present_or(r, "hospital", json!(format!("Hospital {}", index + 1))),
        "avgUnitPrice": number_or_zero(r, "avgUnitPrice"),
    })
}

fn normalize_replenishment(record: &Value, index: usize) -> Value {
    let empty = Map::new();
    let r = record.as_object().unwrap_or(&empty);
    json!({
        "month": present_or(r, "month", json!(format!("M{}", index + 1))),
        "qty": number_or_zero(r, "qty"),
        "cost": number_or_zero(r, "cost"),
    })
}

/// Stock aggregates, computed from the normalized low-stock rows unless the
/// backend supplied a numeric override.
///
/// A row is critical when its quantity is at or below half the reorder
/// threshold. The average stock gap is the mean of
/// `max(0, 1 - qty/reorderLevel)` across all rows (rows without a reorder
/// level contribute zero), rounded to the nearest integer percent.
fn compute_aggregates(low_stock: &[Value], overrides: Option<&Value>) -> Value {
    let empty = Map::new();
    let overrides = overrides.and_then(Value::as_object).unwrap_or(&empty);

    let critical_alerts = match overrides.get("criticalAlerts") {
        Some(value @ Value::Number(_)) => value.clone(),
        _ => {
            let count = low_stock
                .iter()
                .filter(|row| {
                    let qty = row["qty"].as_f64().unwrap_or(0.0);
                    let reorder = row["reorderLevel"].as_f64().unwrap_or(0.0);
                    qty <= reorder / 2.0
                })
                .count();
            json!(count)
        }
    };

    let avg_stock_gap_pct = match overrides.get("avgStockGapPct") {
        Some(value @ Value::Number(_)) => value.clone(),
        _ if low_stock.is_empty() => json!(0),
        _ => {
            let gap_sum: f64 = low_stock
                .iter()
                .map(|row| {
                    let qty = row["qty"].as_f64().unwrap_or(0.0);
                    let reorder = row["reorderLevel"].as_f64().unwrap_or(0.0);
                    if reorder > 0.0 {
                        (1.0 - qty / reorder).max(0.0)
                    } else {
                        0.0
                    }
                })
                .sum();
            json!(((gap_sum / low_stock.len() as f64) * 100.0).round() as i64)
        }
    };

    let projected_monthly_spend = match overrides.get("projectedMonthlySpend") {
        Some(value @ Value::Number(_)) => value.clone(),
        _ => json!(0),
    };

    json!({
        "criticalAlerts": critical_alerts,
        "avgStockGapPct": avg_stock_gap_pct,
        "projectedMonthlySpend": projected_monthly_spend,
    })
}
