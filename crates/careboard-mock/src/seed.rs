//! Deterministic seed data. Every generator is a pure function of the
//! record index so repeated runs produce identical fixtures.

use serde_json::{Value, json};
use time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

pub const HOSPITALS: &[&str] = &[
    "Rabat Central",
    "Casablanca General",
    "Marrakech Health",
    "Tangier Med",
];
pub const DEPARTMENTS: &[&str] = &[
    "Cardiology",
    "Neurology",
    "Pediatrics",
    "Emergency",
    "General Surgery",
];
pub const INSURANCE_TYPES: &[&str] = &["CNOPS", "CNSS", "RAMED", "Private", "None"];
const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "O+", "O-", "AB+", "AB-"];
const FIRST_NAMES: &[&str] = &[
    "Mohammed", "Fatima", "Youssef", "Amina", "Omar", "Khadija", "Hassan", "Zineb", "Karim",
    "Latifa",
];
const LAST_NAMES: &[&str] = &[
    "Benali", "Alami", "Idrissi", "Tazi", "Berrada", "Chraibi", "Fassi", "Mansouri",
];
const CITIES: &[&str] = &["Rabat", "Casablanca", "Fes", "Tangier", "Agadir"];
const ROLES: &[&str] = &["Doctor", "Nurse", "Specialist", "Admin"];
const STATUSES: &[&str] = &["Scheduled", "Completed", "Cancelled", "No Show"];

fn cycle<'a>(options: &[&'a str], index: usize) -> &'a str {
    options[index % options.len()]
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Bare calendar date `offset_days` from today, UTC.
pub fn date_from_today(offset_days: i64) -> String {
    let date = OffsetDateTime::now_utc().date() + Duration::days(offset_days);
    let format = format_description!("[year]-[month]-[day]");
    date.format(format).unwrap_or_default()
}

pub fn seed_patients(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "iid": 1000 + i,
                "cin": format!("{}{}", cycle(&["AB", "BE", "CD"], i), 10000 + i),
                "name": format!("{} {}", cycle(FIRST_NAMES, i), cycle(LAST_NAMES, i)),
                "sex": if i % 2 == 0 { "F" } else { "M" },
                "birthDate": format!("19{}-{:02}-15", 40 + i % 50, 1 + i % 12),
                "bloodGroup": cycle(BLOOD_GROUPS, i),
                "phone": format!("+2126{:08}", 1_000_000 + i * 7),
                "email": format!("patient{i}@careboard.mock"),
                "city": cycle(CITIES, i),
                "insurance": cycle(INSURANCE_TYPES, i),
                "status": if i % 5 == 0 { "Admitted" } else { "Outpatient" },
            })
        })
        .collect()
}

pub fn seed_staff(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": format!("S-{}", 200 + i),
                "name": format!("Dr. {} {i}", cycle(&["Alami", "Bennani", "Daoudi"], i)),
                "role": cycle(ROLES, i),
                "departments": [cycle(DEPARTMENTS, i)],
                "hospitals": [cycle(HOSPITALS, i)],
                "status": "Active",
                "workload": (i * 17 + 23) % 100,
            })
        })
        .collect()
}

pub fn seed_appointments(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": format!("APT-{}", 5000 + i),
                "date": date_from_today((i % 14) as i64),
                "time": format!("{:02}:00", 8 + i % 9),
                "hospital": cycle(HOSPITALS, i),
                "department": cycle(DEPARTMENTS, i),
                "patient": format!("Patient {i}"),
                "staff": format!("Dr. Staff {i}"),
                "reason": "Regular Checkup",
                "status": cycle(STATUSES, i),
            })
        })
        .collect()
}
