//! Appointment book mock: list on GET, booking on POST.

use std::sync::Arc;

use async_trait::async_trait;
use careboard_backend::{BackendConnector, BackendError, ResourceResolver};
use careboard_core::{Method, Params};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::seed::{now_rfc3339, seed_appointments};
use crate::util::{body_object, require_text, stringify};

const STATUS_OPTIONS: &[&str] = &["Scheduled", "Completed", "Cancelled", "No Show"];

type Book = Arc<Mutex<Vec<Value>>>;

struct AppointmentList {
    appointments: Book,
}

#[async_trait]
impl ResourceResolver for AppointmentList {
    async fn resolve(&self, _params: Params, _body: Option<Value>) -> Result<Value, BackendError> {
        let appointments = self.appointments.lock().await;
        Ok(json!({
            "appointments": appointments.clone(),
            "lastSyncedAt": now_rfc3339(),
        }))
    }
}

struct AppointmentBooking {
    appointments: Book,
}

#[async_trait]
impl ResourceResolver for AppointmentBooking {
    async fn resolve(&self, _params: Params, body: Option<Value>) -> Result<Value, BackendError> {
        let body = body_object(body)?;
        require_text(
            &body,
            &[
                "date",
                "time",
                "hospital",
                "department",
                "patient",
                "staff",
                "reason",
                "status",
            ],
        )?;

        let status = body["status"].as_str().unwrap_or_default();
        if !STATUS_OPTIONS.contains(&status) {
            return Err(BackendError::invalid_payload(format!(
                "Status must be one of: {}",
                STATUS_OPTIONS.join(", ")
            )));
        }

        let mut appointments = self.appointments.lock().await;
        let next_id = body
            .get("id")
            .map(|id| stringify(id).trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("APT-{}", 5000 + appointments.len() + 1));
        if appointments
            .iter()
            .any(|apt| apt.get("id").and_then(Value::as_str) == Some(next_id.as_str()))
        {
            return Err(BackendError::conflict("Appointment ID already exists"));
        }

        let record = json!({
            "id": next_id,
            "date": body["date"].clone(),
            "time": body["time"].clone(),
            "hospital": body["hospital"].clone(),
            "department": body["department"].clone(),
            "patient": body["patient"].clone(),
            "staff": body["staff"].clone(),
            "reason": body["reason"].clone(),
            "status": status,
        });
        appointments.insert(0, record.clone());

        Ok(json!({
            "appointment": record,
            "message": "Appointment created via mock endpoint",
        }))
    }
}

pub async fn register(backend: &BackendConnector) -> Result<(), BackendError> {
    let appointments: Book = Arc::new(Mutex::new(seed_appointments(30)));
    backend
        .register_resource(
            "appointments",
            Arc::new(AppointmentList {
                appointments: Arc::clone(&appointments),
            }),
            Method::Get,
        )
        .await?;
    backend
        .register_resource(
            "appointments",
            Arc::new(AppointmentBooking { appointments }),
            Method::Post,
        )
        .await?;
    Ok(())
}
