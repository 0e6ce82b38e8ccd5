//! Overview page: dashboard summary, staff leaderboard and low-stock list.

use std::cmp::Ordering;

use careboard_core::Params;
use serde_json::{Map, Value, json};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use super::ensure_array;
use crate::contract::ModelContract;

pub fn contract() -> ModelContract {
    ModelContract::new()
        .require("staff")
        .require("appointments")
        .require("summary")
        .require("lowStockMedications")
        .validate("staff", Value::is_array)
        .validate("appointments", Value::is_array)
        .validate("summary", Value::is_object)
        .validate("staffLeaderboard", Value::is_array)
        .validate("lowStockMedications", Value::is_array)
}

pub fn transform(raw: Value, _params: &Params) -> Value {
    let empty = Map::new();
    let payload = raw.as_object().unwrap_or(&empty);

    let mut model = payload.clone();
    model.insert("summary".into(), build_summary(payload));
    model.insert("staffLeaderboard".into(), build_leaderboard(payload));
    model.insert(
        "lowStockMedications".into(),
        Value::Array(ensure_array(payload.get("lowStockMedications"))),
    );
    Value::Object(model)
}

/// Precomputed summary passes through; otherwise derive it from the raw
/// patient/staff/appointment lists.
fn build_summary(payload: &Map<String, Value>) -> Value {
    if let Some(summary) = payload.get("summary")
        && summary.is_object()
    {
        return summary.clone();
    }

    let patients = ensure_array(payload.get("patients"));
    let staff = ensure_array(payload.get("staff"));
    let appointments = ensure_array(payload.get("appointments"));

    let now = OffsetDateTime::now_utc();
    let upcoming = appointments
        .iter()
        .filter(|apt| {
            apt.get("date")
                .and_then(Value::as_str)
                .and_then(parse_instant)
                .is_some_and(|instant| instant >= now)
        })
        .count();

    let count_status = |rows: &[Value], status: &str| {
        rows.iter()
            .filter(|row| row.get("status").and_then(Value::as_str) == Some(status))
            .count()
    };

    json!({
        "totalAppointments": appointments.len(),
        "upcomingAppointments": upcoming,
        "activeStaff": count_status(&staff, "Active"),
        "admittedPatients": count_status(&patients, "Admitted"),
    })
}

/// A provided leaderboard passes through; otherwise the top five staff by
/// workload (missing workloads count as zero).
fn build_leaderboard(payload: &Map<String, Value>) -> Value {
    if let Some(board) = payload.get("staffLeaderboard")
        && board.is_array()
    {
        return board.clone();
    }

    let mut staff = ensure_array(payload.get("staff"));
    let workload =
        |member: &Value| member.get("workload").and_then(Value::as_f64).unwrap_or(0.0);
    staff.sort_by(|a, b| {
        workload(b)
            .partial_cmp(&workload(a))
            .unwrap_or(Ordering::Equal)
    });
    staff.truncate(5);
    Value::Array(staff)
}

/// Appointment dates arrive either as RFC 3339 instants or bare dates;
/// bare dates count as midnight UTC.
fn parse_instant(text: &str) -> Option<OffsetDateTime> {
    if let Ok(instant) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(instant);
    }
    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(text, format).ok()?;
    Some(date.with_time(Time::MIDNIGHT).assume_utc())
}
