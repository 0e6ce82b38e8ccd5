//! Staff roster mock: read-only list.

use std::sync::Arc;

use async_trait::async_trait;
use careboard_backend::{BackendConnector, BackendError, ResourceResolver};
use careboard_core::{Method, Params};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::seed::{now_rfc3339, seed_staff};

struct StaffRoster {
    staff: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl ResourceResolver for StaffRoster {
    async fn resolve(&self, _params: Params, _body: Option<Value>) -> Result<Value, BackendError> {
        let staff = self.staff.lock().await;
        Ok(json!({
            "staff": staff.clone(),
            "lastSyncedAt": now_rfc3339(),
        }))
    }
}

pub async fn register(backend: &BackendConnector) -> Result<(), BackendError> {
    let staff = Arc::new(Mutex::new(seed_staff(24)));
    backend
        .register_resource("staff", Arc::new(StaffRoster { staff }), Method::Get)
        .await?;
    Ok(())
}
