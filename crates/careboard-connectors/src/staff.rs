//! Staff onboarding.

use std::sync::Arc;

use careboard_backend::BackendConnector;
use careboard_core::Params;
use careboard_models::ModelConnector;
use serde_json::Value;
use tracing::debug;

use crate::error::{ConnectorError, Result};
use crate::payload::{as_object, blank_fields};

const REQUIRED_FIELDS: &[&str] = &["name", "role"];

pub struct StaffConnector {
    backend: Arc<BackendConnector>,
    models: Arc<ModelConnector>,
}

impl StaffConnector {
    pub fn new(backend: Arc<BackendConnector>, models: Arc<ModelConnector>) -> Self {
        Self { backend, models }
    }

    pub async fn add_staff(&self, payload: Value) -> Result<Value> {
        let body = as_object(&payload, "Staff")?;
        let missing = blank_fields(body, REQUIRED_FIELDS);
        if !missing.is_empty() {
            return Err(ConnectorError::missing_fields(missing));
        }

        let response = self.backend.post("staff", payload, Params::new()).await?;
        debug!(page = "Staff", "invalidating after onboarding");
        self.models.clear_cache(Some("Staff")).await;
        self.models.clear_cache(Some("Overview")).await;
        Ok(response)
    }
}
