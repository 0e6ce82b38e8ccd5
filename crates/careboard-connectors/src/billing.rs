//! Billing dashboard loads and expense creation.

use std::sync::Arc;

use careboard_backend::BackendConnector;
use careboard_core::Params;
use careboard_models::{LoadOptions, ModelConnector};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{ConnectorError, Result};
use crate::payload::{as_object, coerce_number, number_value};

/// Insurance dimension of a billing filter. `SelfPay` is an explicit
/// filter value, not an absent one: it is sent as a null `insurance_id`
/// so resolvers can distinguish "self-pay only" from "any insurer".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsuranceScope {
    #[default]
    Any,
    SelfPay,
    Insurer(i64),
}

/// Filters applied to the billing dashboard load. All dimensions are
/// optional; an empty filter loads the unscoped dashboard.
#[derive(Debug, Clone, Default)]
pub struct BillingFilters {
    pub hospital_id: Option<i64>,
    pub department_id: Option<i64>,
    pub insurance: InsuranceScope,
    pub days_back: Option<i64>,
}

pub struct BillingConnector {
    backend: Arc<BackendConnector>,
    models: Arc<ModelConnector>,
}

impl BillingConnector {
    pub fn new(backend: Arc<BackendConnector>, models: Arc<ModelConnector>) -> Self {
        Self { backend, models }
    }

    /// Loads the billing dashboard through the model cache. Each filter
    /// combination caches independently.
    pub async fn load_dashboard(
        &self,
        filters: &BillingFilters,
        options: LoadOptions,
    ) -> Result<Value> {
        let params = build_filter_params(filters);
        Ok(self.models.load("Billing", params, options).await?)
    }

    /// Posts a validated expense and drops every cached billing view on
    /// success. Validation failures leave the cache intact.
    pub async fn create_expense(&self, payload: Value) -> Result<Value> {
        let normalized = normalize_expense_payload(&payload)?;
        let response = self
            .backend
            .post("billing/expense", normalized, Params::new())
            .await?;
        self.invalidate_dashboard().await;
        Ok(response)
    }

    pub async fn invalidate_dashboard(&self) {
        debug!(page = "Billing", "invalidating billing dashboard");
        self.models.clear_cache(Some("Billing")).await;
    }
}

/// Maps the typed filters onto wire parameter names. `Any` insurance
/// omits the key entirely while `SelfPay` sends an explicit null.
pub fn build_filter_params(filters: &BillingFilters) -> Params {
    let mut params = Params::new();
    if let Some(hospital_id) = filters.hospital_id {
        params.insert("hospital_id".into(), json!(hospital_id));
    }
    if let Some(department_id) = filters.department_id {
        params.insert("department_id".into(), json!(department_id));
    }
    match filters.insurance {
        InsuranceScope::Any => {}
        InsuranceScope::SelfPay => {
            params.insert("insurance_id".into(), Value::Null);
        }
        InsuranceScope::Insurer(id) => {
            params.insert("insurance_id".into(), json!(id));
        }
    }
    if let Some(days_back) = filters.days_back {
        params.insert("days_back".into(), json!(days_back));
    }
    params
}

/// Reduces an expense payload to its canonical shape. The activity
/// identifier may arrive as `caid`, `activityId`, or nested under
/// `activity.caid`; the amount as `total` or `amount`. Both must be
/// numeric and the amount non-negative.
pub fn normalize_expense_payload(payload: &Value) -> Result<Value> {
    let body = as_object(payload, "Expense")?;

    let caid_raw = first_set(body, &["caid", "activityId"])
        .or_else(|| body.get("activity").and_then(|a| non_null(a.get("caid"))))
        .ok_or_else(|| ConnectorError::invalid_field("Expense payload requires a caid value"))?;

    let total_raw = first_set(body, &["total", "amount"])
        .ok_or_else(|| ConnectorError::invalid_field("Expense payload requires a total amount"))?;

    let caid = coerce_number(caid_raw)
        .ok_or_else(|| ConnectorError::invalid_field("Expense payload caid must be numeric"))?;

    let total = coerce_number(total_raw).filter(|total| *total >= 0.0).ok_or_else(|| {
        ConnectorError::invalid_field("Expense total must be a positive number")
    })?;

    let mut normalized = Map::new();
    normalized.insert("caid".into(), number_value(caid));
    normalized.insert("total".into(), number_value(total));

    let insurance = non_null(body.get("insId"))
        .cloned()
        .or_else(|| body.get("insurance").and_then(|i| i.get("insId")).cloned());
    if let Some(ins_id) = insurance {
        normalized.insert("insId".into(), ins_id);
    }

    Ok(Value::Object(normalized))
}

fn first_set<'a>(body: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| non_null(body.get(*key)))
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}
