//! Overview dashboard mock: composes the domain seeds into the
//! `core-dashboard` resource shape.

use std::sync::Arc;

use async_trait::async_trait;
use careboard_backend::{BackendConnector, BackendError, ResourceResolver};
use careboard_core::{Method, Params};
use serde_json::{Value, json};

use crate::seed::{now_rfc3339, seed_appointments, seed_patients, seed_staff};

struct DashboardSnapshot {
    low_stock: Vec<Value>,
}

#[async_trait]
impl ResourceResolver for DashboardSnapshot {
    async fn resolve(&self, _params: Params, _body: Option<Value>) -> Result<Value, BackendError> {
        Ok(json!({
            "patients": seed_patients(25),
            "staff": seed_staff(24),
            "appointments": seed_appointments(30),
            "lowStockMedications": self.low_stock,
            "lastSyncedAt": now_rfc3339(),
        }))
    }
}

pub async fn register(backend: &BackendConnector) -> Result<(), BackendError> {
    let low_stock = vec![
        json!({ "id": "MED-101", "name": "Amoxicillin 500mg", "hospital": "Rabat Central", "qty": 42, "reorderLevel": 100 }),
        json!({ "id": "MED-088", "name": "Insulin Regular", "hospital": "Casablanca General", "qty": 20, "reorderLevel": 80 }),
        json!({ "id": "MED-330", "name": "Atorvastatin 20mg", "hospital": "Fes Regional", "qty": 18, "reorderLevel": 60 }),
    ];
    backend
        .register_resource(
            "core-dashboard",
            Arc::new(DashboardSnapshot { low_stock }),
            Method::Get,
        )
        .await?;
    Ok(())
}
