//! In-process mock resolvers for every careboard resource.
//!
//! Each domain module registers one resolver per verb on a shared,
//! mutex-guarded state so mutations are visible to subsequent reads
//! within the same process. Seed data is deterministic; only the
//! `lastSyncedAt` stamps move.

use careboard_backend::{BackendConnector, BackendError};
use tracing::debug;

pub mod appointments;
pub mod billing;
pub mod dashboard;
pub mod medications;
pub mod patients;
pub mod seed;
pub mod staff;

mod util;

/// Registers every mock resolver on the given dispatcher.
pub async fn register_all(backend: &BackendConnector) -> Result<(), BackendError> {
    patients::register(backend).await?;
    staff::register(backend).await?;
    appointments::register(backend).await?;
    medications::register(backend).await?;
    billing::register(backend).await?;
    dashboard::register(backend).await?;
    debug!("mock resolvers registered");
    Ok(())
}
