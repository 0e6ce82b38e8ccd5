//! Medication stock mock: snapshot on GET, catalogue and stock entry
//! mutations on POST.

use std::sync::Arc;

use async_trait::async_trait;
use careboard_backend::{BackendConnector, BackendError, ResourceResolver};
use careboard_core::{Method, Params};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::seed::now_rfc3339;
use crate::util::{body_object, number_or_zero, require_present, stringify};

/// Mutable stock state shared by the three resolvers.
struct StockState {
    low_stock: Vec<Value>,
    pricing_summary: Vec<Value>,
    price_series: Vec<Value>,
    replenishment_trend: Vec<Value>,
}

impl StockState {
    fn seeded() -> Self {
        Self {
            low_stock: vec![
                json!({ "id": "MED-101", "name": "Amoxicillin 500mg", "hospital": "Rabat Central", "qty": 42, "reorderLevel": 100, "unit": "boxes", "class": "Antibiotic" }),
                json!({ "id": "MED-088", "name": "Insulin Regular", "hospital": "Casablanca General", "qty": 20, "reorderLevel": 80, "unit": "vials", "class": "Endocrine" }),
                json!({ "id": "MED-215", "name": "Aspirin 81mg", "hospital": "Tangier Med", "qty": 65, "reorderLevel": 120, "unit": "packs", "class": "Analgesic" }),
                json!({ "id": "MED-330", "name": "Atorvastatin 20mg", "hospital": "Fes Regional", "qty": 18, "reorderLevel": 60, "unit": "packs", "class": "Cardio" }),
            ],
            pricing_summary: vec![
                json!({ "hospital": "Rabat Central", "medication": "Amoxicillin 500mg", "avg": 34.5, "min": 31.0, "max": 37.8, "updatedAt": "2025-11-26T10:30:00Z" }),
                json!({ "hospital": "Casablanca General", "medication": "Insulin Regular", "avg": 128.0, "min": 120.0, "max": 134.0, "updatedAt": "2025-11-25T09:10:00Z" }),
                json!({ "hospital": "Tangier Med", "medication": "Aspirin 81mg", "avg": 9.5, "min": 8.9, "max": 10.1, "updatedAt": "2025-11-27T14:45:00Z" }),
                json!({ "hospital": "Fes Regional", "medication": "Atorvastatin 20mg", "avg": 52.0, "min": 50.0, "max": 56.0, "updatedAt": "2025-11-24T16:20:00Z" }),
            ],
            price_series: vec![
                json!({ "hospital": "Rabat Central", "avgUnitPrice": 34.5 }),
                json!({ "hospital": "Casablanca General", "avgUnitPrice": 128.0 }),
                json!({ "hospital": "Tangier Med", "avgUnitPrice": 9.5 }),
                json!({ "hospital": "Fes Regional", "avgUnitPrice": 52.0 }),
                json!({ "hospital": "Marrakech Health", "avgUnitPrice": 62.0 }),
            ],
            replenishment_trend: vec![
                json!({ "month": "Jun", "qty": 540, "cost": 12200 }),
                json!({ "month": "Jul", "qty": 610, "cost": 13100 }),
                json!({ "month": "Aug", "qty": 500, "cost": 11800 }),
                json!({ "month": "Sep", "qty": 650, "cost": 13750 }),
                json!({ "month": "Oct", "qty": 700, "cost": 14200 }),
                json!({ "month": "Nov", "qty": 720, "cost": 14600 }),
            ],
        }
    }

    fn aggregates(&self) -> Value {
        let critical = self
            .low_stock
            .iter()
            .filter(|item| {
                let qty = number_or_zero(item.get("qty"));
                let reorder = number_or_zero(item.get("reorderLevel"));
                qty <= reorder / 2.0
            })
            .count();
        let gap = if self.low_stock.is_empty() {
            0
        } else {
            let sum: f64 = self
                .low_stock
                .iter()
                .map(|item| {
                    let reorder = number_or_zero(item.get("reorderLevel"));
                    if reorder == 0.0 {
                        0.0
                    } else {
                        (1.0 - number_or_zero(item.get("qty")) / reorder).max(0.0)
                    }
                })
                .sum();
            ((sum / self.low_stock.len() as f64) * 100.0).round() as i64
        };
        json!({
            "criticalAlerts": critical,
            "avgStockGapPct": gap,
            "projectedMonthlySpend": 146_000,
        })
    }

    fn snapshot(&self) -> Value {
        json!({
            "lowStock": self.low_stock,
            "pricingSummary": self.pricing_summary,
            "priceSeries": self.price_series,
            "replenishmentTrend": self.replenishment_trend,
            "aggregates": self.aggregates(),
            "lastSyncedAt": now_rfc3339(),
        })
    }
}

type SharedStock = Arc<Mutex<StockState>>;

struct StockSnapshot {
    state: SharedStock,
}

#[async_trait]
impl ResourceResolver for StockSnapshot {
    async fn resolve(&self, _params: Params, _body: Option<Value>) -> Result<Value, BackendError> {
        Ok(self.state.lock().await.snapshot())
    }
}

struct MedicationCreation {
    state: SharedStock,
}

#[async_trait]
impl ResourceResolver for MedicationCreation {
    async fn resolve(&self, _params: Params, body: Option<Value>) -> Result<Value, BackendError> {
        let body = body_object(body)?;
        require_present(
            &body,
            &["id", "name", "hospital", "qty", "reorderLevel", "unit", "class"],
        )?;

        let record = json!({
            "id": stringify(&body["id"]).trim(),
            "name": stringify(&body["name"]).trim(),
            "hospital": stringify(&body["hospital"]).trim(),
            "qty": number_or_zero(body.get("qty")),
            "reorderLevel": number_or_zero(body.get("reorderLevel")),
            "unit": stringify(&body["unit"]).trim(),
            "class": stringify(body.get("class").unwrap_or(&json!("General"))).trim(),
        });

        let mut state = self.state.lock().await;
        state.low_stock.insert(0, record.clone());

        Ok(json!({
            "medication": record,
            "message": "Medication registered via mock endpoint",
        }))
    }
}

struct StockEntry {
    state: SharedStock,
}

#[async_trait]
impl ResourceResolver for StockEntry {
    async fn resolve(&self, _params: Params, body: Option<Value>) -> Result<Value, BackendError> {
        let body = body_object(body)?;
        require_present(&body, &["medicationId", "hospital", "qtyReceived", "unitPrice"])?;

        let qty_received = number_or_zero(body.get("qtyReceived"));
        let unit_price = number_or_zero(body.get("unitPrice"));
        let medication_id = stringify(&body["medicationId"]);
        let hospital = stringify(&body["hospital"]);
        let medication_name = body
            .get("medicationName")
            .map(stringify)
            .unwrap_or_else(|| medication_id.clone());

        let mut state = self.state.lock().await;

        for record in &mut state.low_stock {
            if record.get("id").and_then(Value::as_str) == Some(medication_id.as_str())
                && record.get("hospital").and_then(Value::as_str) == Some(hospital.as_str())
            {
                let qty = number_or_zero(record.get("qty")) + qty_received;
                record["qty"] = json!(qty);
            }
        }

        for entry in &mut state.price_series {
            if entry.get("hospital").and_then(Value::as_str) == Some(hospital.as_str()) {
                entry["avgUnitPrice"] = json!(unit_price);
            }
        }

        state.replenishment_trend.remove(0);
        state.replenishment_trend.push(json!({
            "month": "Now",
            "qty": qty_received,
            "cost": qty_received * unit_price,
        }));

        for entry in &mut state.pricing_summary {
            if entry.get("medication").and_then(Value::as_str) == Some(medication_name.as_str())
                && entry.get("hospital").and_then(Value::as_str) == Some(hospital.as_str())
            {
                let min = number_or_zero(entry.get("min")).min(unit_price);
                let max = number_or_zero(entry.get("max")).max(unit_price);
                entry["avg"] = json!(unit_price);
                entry["min"] = json!(min);
                entry["max"] = json!(max);
                entry["updatedAt"] = json!(now_rfc3339());
            }
        }

        Ok(json!({
            "stockEntry": {
                "medicationId": medication_id,
                "medicationName": medication_name,
                "hospital": hospital,
                "qtyReceived": qty_received,
                "unitPrice": unit_price,
            },
            "message": "Stock entry added via mock endpoint",
        }))
    }
}

pub async fn register(backend: &BackendConnector) -> Result<(), BackendError> {
    let state: SharedStock = Arc::new(Mutex::new(StockState::seeded()));
    backend
        .register_resource(
            "medications",
            Arc::new(StockSnapshot {
                state: Arc::clone(&state),
            }),
            Method::Get,
        )
        .await?;
    backend
        .register_resource(
            "medications",
            Arc::new(MedicationCreation {
                state: Arc::clone(&state),
            }),
            Method::Post,
        )
        .await?;
    backend
        .register_resource("medications/stock", Arc::new(StockEntry { state }), Method::Post)
        .await?;
    Ok(())
}
