//! Patient directory mock: list on GET, admission on POST.

use std::sync::Arc;

use async_trait::async_trait;
use careboard_backend::{BackendConnector, BackendError, ResourceResolver};
use careboard_core::{Method, Params};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::seed::{now_rfc3339, seed_patients};
use crate::util::{body_object, require_text, stringify};

type Directory = Arc<Mutex<Vec<Value>>>;

struct PatientList {
    patients: Directory,
}

#[async_trait]
impl ResourceResolver for PatientList {
    async fn resolve(&self, _params: Params, _body: Option<Value>) -> Result<Value, BackendError> {
        let patients = self.patients.lock().await;
        Ok(json!({
            "patients": patients.clone(),
            "lastSyncedAt": now_rfc3339(),
        }))
    }
}

struct PatientAdmission {
    patients: Directory,
}

#[async_trait]
impl ResourceResolver for PatientAdmission {
    async fn resolve(&self, _params: Params, body: Option<Value>) -> Result<Value, BackendError> {
        let body = body_object(body)?;
        require_text(&body, &["iid", "cin", "name", "sex"])?;

        let iid: i64 = stringify(&body["iid"])
            .trim()
            .parse()
            .map_err(|_| BackendError::invalid_payload("IID must be a numeric value"))?;

        let cin = stringify(&body["cin"]).trim().to_uppercase();
        if cin.len() > 10 {
            return Err(BackendError::invalid_payload(
                "CIN exceeds maximum length of 10 characters",
            ));
        }

        let mut patients = self.patients.lock().await;
        if patients
            .iter()
            .any(|p| stringify(&p["iid"]) == iid.to_string())
        {
            return Err(BackendError::conflict("IID already exists"));
        }
        if patients.iter().any(|p| {
            p.get("cin")
                .and_then(Value::as_str)
                .is_some_and(|existing| existing.to_uppercase() == cin)
        }) {
            return Err(BackendError::conflict("CIN already exists"));
        }

        let record = json!({
            "iid": iid,
            "cin": cin,
            "name": stringify(&body["name"]).trim(),
            "birthDate": body.get("birth").or_else(|| body.get("birthDate")).cloned().unwrap_or(Value::Null),
            "sex": body["sex"].clone(),
            "bloodGroup": body.get("bloodGroup").cloned().unwrap_or(Value::Null),
            "phone": body.get("phone").cloned().unwrap_or(Value::Null),
            "email": body.get("email").cloned().unwrap_or(Value::Null),
            "city": body.get("city").cloned().unwrap_or(json!("N/A")),
            "insurance": body.get("insurance").cloned().unwrap_or(json!("None")),
            "status": body.get("status").cloned().unwrap_or(json!("Outpatient")),
        });
        patients.insert(0, record.clone());

        Ok(json!({
            "patient": record,
            "message": "Patient created via mock endpoint",
        }))
    }
}

pub async fn register(backend: &BackendConnector) -> Result<(), BackendError> {
    let patients: Directory = Arc::new(Mutex::new(seed_patients(25)));
    backend
        .register_resource(
            "patients",
            Arc::new(PatientList {
                patients: Arc::clone(&patients),
            }),
            Method::Get,
        )
        .await?;
    backend
        .register_resource(
            "patients",
            Arc::new(PatientAdmission { patients }),
            Method::Post,
        )
        .await?;
    Ok(())
}
