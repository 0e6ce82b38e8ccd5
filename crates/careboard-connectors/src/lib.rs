//! Per-domain mutation connectors.
//!
//! Each connector pairs a [`BackendConnector`](careboard_backend::BackendConnector)
//! for dispatch with a [`ModelConnector`](careboard_models::ModelConnector)
//! for cache invalidation. Payloads are validated and normalized in the
//! connector, before any request leaves the process; a rejected payload
//! never touches the cache, and a failed post never invalidates it.

pub mod appointments;
pub mod billing;
pub mod error;
pub mod medications;
pub mod patients;
pub mod staff;

mod payload;

pub use appointments::{AppointmentConnector, STATUS_OPTIONS, validate_appointment_payload};
pub use billing::{
    BillingConnector, BillingFilters, InsuranceScope, build_filter_params,
    normalize_expense_payload,
};
pub use error::{ConnectorError, Result};
pub use medications::{
    MedicationsConnector, normalize_medication_payload, normalize_stock_payload,
};
pub use patients::{PatientConnector, normalize_patient_payload};
pub use staff::StaffConnector;
