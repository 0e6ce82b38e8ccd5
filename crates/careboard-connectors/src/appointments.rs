//! Appointment scheduling.

use std::sync::Arc;

use careboard_backend::BackendConnector;
use careboard_core::Params;
use careboard_models::ModelConnector;
use serde_json::Value;
use tracing::debug;

use crate::error::{ConnectorError, Result};
use crate::payload::{as_object, blank_fields};

const REQUIRED_FIELDS: &[&str] = &[
    "date",
    "time",
    "hospital",
    "department",
    "patient",
    "staff",
    "reason",
    "status",
];

/// The only states an appointment may be created in.
pub const STATUS_OPTIONS: &[&str] = &["Scheduled", "Completed", "Cancelled", "No Show"];

pub struct AppointmentConnector {
    backend: Arc<BackendConnector>,
    models: Arc<ModelConnector>,
}

impl AppointmentConnector {
    pub fn new(backend: Arc<BackendConnector>, models: Arc<ModelConnector>) -> Self {
        Self { backend, models }
    }

    /// Posts a validated appointment to the `appointments` resource and
    /// invalidates the cached `Appointments` views on success.
    pub async fn add_appointment(&self, payload: Value) -> Result<Value> {
        validate_appointment_payload(&payload)?;
        let response = self
            .backend
            .post("appointments", payload, Params::new())
            .await?;
        debug!(page = "Appointments", "invalidating after scheduling");
        self.models.clear_cache(Some("Appointments")).await;
        self.models.clear_cache(Some("Overview")).await;
        Ok(response)
    }
}

pub fn validate_appointment_payload(payload: &Value) -> Result<()> {
    let body = as_object(payload, "Appointment")?;

    let missing = blank_fields(body, REQUIRED_FIELDS);
    if !missing.is_empty() {
        return Err(ConnectorError::missing_fields(missing));
    }

    let status = body["status"].as_str().unwrap_or_default();
    if !STATUS_OPTIONS.contains(&status) {
        return Err(ConnectorError::invalid_field(format!(
            "Status must be one of: {}",
            STATUS_OPTIONS.join(", ")
        )));
    }
    Ok(())
}
