//! Patient admissions.

use std::sync::Arc;

use careboard_backend::BackendConnector;
use careboard_core::Params;
use careboard_models::ModelConnector;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ConnectorError, Result};
use crate::payload::{as_object, blank_fields, trim_string_field};

const REQUIRED_FIELDS: &[&str] = &["iid", "cin", "name", "sex"];
const CIN_MAX_LEN: usize = 10;

pub struct PatientConnector {
    backend: Arc<BackendConnector>,
    models: Arc<ModelConnector>,
}

impl PatientConnector {
    pub fn new(backend: Arc<BackendConnector>, models: Arc<ModelConnector>) -> Self {
        Self { backend, models }
    }

    /// Validates and normalizes the admission payload, posts it to the
    /// `patients` resource, and drops every cached `Patients` view on
    /// success. A rejected payload never reaches the dispatcher.
    pub async fn add_patient(&self, payload: Value) -> Result<Value> {
        let normalized = normalize_patient_payload(payload)?;
        let response = self
            .backend
            .post("patients", normalized, Params::new())
            .await?;
        debug!(page = "Patients", "invalidating after patient admission");
        self.models.clear_cache(Some("Patients")).await;
        self.models.clear_cache(Some("Overview")).await;
        Ok(response)
    }
}

/// Enforces the admission contract: the identity fields must carry
/// visible text, the internal identifier must be numeric, and the CIN is
/// uppercased and capped at ten characters.
pub fn normalize_patient_payload(payload: Value) -> Result<Value> {
    let body = as_object(&payload, "Patient")?;

    let missing = blank_fields(body, REQUIRED_FIELDS);
    if !missing.is_empty() {
        return Err(ConnectorError::missing_fields(missing));
    }

    let iid_raw = stringify(&body["iid"]);
    let iid: i64 = iid_raw
        .trim()
        .parse()
        .map_err(|_| ConnectorError::invalid_field("IID must be a numeric value"))?;

    let cin = stringify(&body["cin"]).trim().to_uppercase();
    if cin.len() > CIN_MAX_LEN {
        return Err(ConnectorError::invalid_field(
            "CIN exceeds maximum length of 10 characters",
        ));
    }

    let mut normalized = body.clone();
    normalized.insert("iid".into(), json!(iid));
    normalized.insert("cin".into(), Value::String(cin));
    trim_string_field(&mut normalized, "name");
    Ok(Value::Object(normalized))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_identity_fields() {
        let err = normalize_patient_payload(json!({
            "iid": 1203,
            "cin": "  ",
            "name": "Imane Berrada",
            "sex": ""
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing fields: cin, sex");
    }

    #[test]
    fn rejects_non_numeric_iid() {
        let err = normalize_patient_payload(json!({
            "iid": "P-1203",
            "cin": "AB123",
            "name": "Imane Berrada",
            "sex": "F"
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "IID must be a numeric value");
    }

    #[test]
    fn uppercases_and_caps_the_cin() {
        let normalized = normalize_patient_payload(json!({
            "iid": "1203",
            "cin": " ab1234 ",
            "name": "  Imane Berrada ",
            "sex": "F"
        }))
        .unwrap();
        assert_eq!(normalized["iid"], json!(1203));
        assert_eq!(normalized["cin"], json!("AB1234"));
        assert_eq!(normalized["name"], json!("Imane Berrada"));

        let err = normalize_patient_payload(json!({
            "iid": 1,
            "cin": "AB123456789",
            "name": "X",
            "sex": "M"
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "CIN exceeds maximum length of 10 characters");
    }

    #[test]
    fn passes_optional_fields_through() {
        let normalized = normalize_patient_payload(json!({
            "iid": 1203,
            "cin": "AB123",
            "name": "Imane Berrada",
            "sex": "F",
            "hospital": "Rabat Central"
        }))
        .unwrap();
        assert_eq!(normalized["hospital"], json!("Rabat Central"));
    }
}
