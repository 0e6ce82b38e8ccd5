//! Medication catalogue additions and stock reception.

use std::sync::Arc;

use careboard_backend::BackendConnector;
use careboard_core::Params;
use careboard_models::ModelConnector;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{ConnectorError, Result};
use crate::payload::{as_object, coerce_number, number_value, trim_string_field, unset_fields};

const MEDICATION_FIELDS: &[&str] = &["id", "name", "hospital", "qty", "reorderLevel", "unit", "class"];
const STOCK_FIELDS: &[&str] = &["medicationId", "hospital", "qtyReceived", "unitPrice"];

pub struct MedicationsConnector {
    backend: Arc<BackendConnector>,
    models: Arc<ModelConnector>,
}

impl MedicationsConnector {
    pub fn new(backend: Arc<BackendConnector>, models: Arc<ModelConnector>) -> Self {
        Self { backend, models }
    }

    /// Adds a medication to the catalogue. Quantities are coerced to
    /// numbers before dispatch; a quantity of zero is a legitimate
    /// starting stock level and passes validation.
    pub async fn add_medication(&self, payload: Value) -> Result<Value> {
        let normalized = normalize_medication_payload(payload)?;
        let response = self
            .backend
            .post("medications", normalized, Params::new())
            .await?;
        self.invalidate().await;
        Ok(response)
    }

    /// Records a stock delivery against an existing medication.
    pub async fn add_stock_entry(&self, payload: Value) -> Result<Value> {
        let normalized = normalize_stock_payload(payload)?;
        let response = self
            .backend
            .post("medications/stock", normalized, Params::new())
            .await?;
        self.invalidate().await;
        Ok(response)
    }

    async fn invalidate(&self) {
        debug!(page = "Medications", "invalidating after stock mutation");
        self.models.clear_cache(Some("Medications")).await;
        self.models.clear_cache(Some("Overview")).await;
    }
}

pub fn normalize_medication_payload(payload: Value) -> Result<Value> {
    let body = as_object(&payload, "Medication")?;

    let missing = unset_fields(body, MEDICATION_FIELDS);
    if !missing.is_empty() {
        return Err(ConnectorError::missing_fields(missing));
    }

    let mut normalized = body.clone();
    for field in ["id", "name", "hospital", "unit", "class"] {
        trim_string_field(&mut normalized, field);
    }
    coerce_field(&mut normalized, "qty");
    coerce_field(&mut normalized, "reorderLevel");
    Ok(Value::Object(normalized))
}

pub fn normalize_stock_payload(payload: Value) -> Result<Value> {
    let body = as_object(&payload, "Stock entry")?;

    let missing = unset_fields(body, STOCK_FIELDS);
    if !missing.is_empty() {
        return Err(ConnectorError::missing_fields(missing));
    }

    let mut normalized = body.clone();
    trim_string_field(&mut normalized, "medicationId");
    trim_string_field(&mut normalized, "hospital");
    coerce_field(&mut normalized, "qtyReceived");
    coerce_field(&mut normalized, "unitPrice");
    Ok(Value::Object(normalized))
}

/// Non-numeric quantities collapse to zero rather than failing the
/// mutation; presence was already checked above.
fn coerce_field(body: &mut Map<String, Value>, field: &str) {
    let coerced = body
        .get(field)
        .and_then(coerce_number)
        .map(number_value)
        .unwrap_or_else(|| json!(0));
    body.insert(field.to_string(), coerced);
}
