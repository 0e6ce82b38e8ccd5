//! Billing dashboard mock: snapshot on GET, expense capture on POST.

use std::sync::Arc;

use async_trait::async_trait;
use careboard_backend::{BackendConnector, BackendError, ResourceResolver};
use careboard_core::{Method, Params};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::seed::now_rfc3339;
use crate::util::{body_object, number_or_zero, require_present};

const RECENT_EXPENSES_CAP: usize = 25;

fn seeded_snapshot() -> Value {
    json!({
        "kpis": [
            { "key": "totalMonthlyBillings", "title": "Total Billings (30d)", "value": 1_280_000, "unit": "MAD", "subtext": "417 clinical activities", "trend": { "direction": "up", "value": 0.084 }, "iconKey": "CreditCard" },
            { "key": "insuredCoverage", "title": "Insured Coverage", "value": 0.78, "unit": "ratio", "subtext": "Weighted by Expense.Total", "trend": { "direction": "up", "value": 0.032 }, "iconKey": "ShieldCheck" },
            { "key": "avgExpense", "title": "Average Expense", "value": 3050, "unit": "MAD", "subtext": "Per billed activity", "trend": { "direction": "down", "value": 0.012 }, "iconKey": "Clock3" },
            { "key": "activeHospitals", "title": "Active Hospitals", "value": 9, "unit": "count", "subtext": "With billable activity", "trend": { "direction": "up", "value": 0.05 }, "iconKey": "AlertTriangle" },
        ],
        "insuranceSplit": [
            { "insId": 1, "type": "CNOPS", "amount": 520_000, "activities": 138, "share": 41 },
            { "insId": 2, "type": "CNSS", "amount": 410_000, "activities": 112, "share": 32 },
            { "insId": 3, "type": "RAMED", "amount": 165_000, "activities": 74, "share": 13 },
            { "insId": 4, "type": "Private", "amount": 135_000, "activities": 41, "share": 11 },
            { "insId": null, "type": "Self-Pay", "amount": 50_000, "activities": 32, "share": 3 },
        ],
        "hospitalRollup": [
            { "hid": 1, "name": "Casablanca Central", "region": "Casablanca-Settat", "total": 260_000, "activities": 84, "insuredShare": 0.81, "avgExpense": 3095 },
            { "hid": 2, "name": "Rabat University Hospital", "region": "Rabat-Salé-Kénitra", "total": 215_000, "activities": 72, "insuredShare": 0.79, "avgExpense": 2986 },
            { "hid": 3, "name": "Tangier Regional", "region": "Tanger-Tétouan-Al Hoceïma", "total": 142_000, "activities": 46, "insuredShare": 0.64, "avgExpense": 3087 },
            { "hid": 4, "name": "Fez Specialist Center", "region": "Fès-Meknès", "total": 118_000, "activities": 39, "insuredShare": 0.73, "avgExpense": 3025 },
            { "hid": 5, "name": "Oujda Teaching Hospital", "region": "Oriental", "total": 87_000, "activities": 28, "insuredShare": 0.52, "avgExpense": 3107 },
        ],
        "departmentSummary": [
            { "depId": 11, "hospital": "Casablanca Central", "department": "Cardiology", "specialty": "Cardiology", "total": 76_000, "activities": 22, "avgExpense": 3450 },
            { "depId": 14, "hospital": "Casablanca Central", "department": "Oncology", "specialty": "Oncology", "total": 54_000, "activities": 14, "avgExpense": 3850 },
            { "depId": 21, "hospital": "Rabat University Hospital", "department": "Neurology", "specialty": "Neurology", "total": 51_000, "activities": 17, "avgExpense": 3000 },
            { "depId": 27, "hospital": "Tangier Regional", "department": "Emergency", "specialty": "Emergency", "total": 42_000, "activities": 25, "avgExpense": 1680 },
            { "depId": 31, "hospital": "Fez Specialist Center", "department": "Orthopedics", "specialty": "Orthopedics", "total": 39_500, "activities": 13, "avgExpense": 3038 },
        ],
        "recentExpenses": [
            {
                "expId": 1048, "caid": 8123, "activityDate": "2025-11-12T09:45:00Z",
                "hospital": { "hid": 4, "name": "Rabat University Hospital" },
                "department": { "depId": 21, "name": "Cardiology" },
                "patient": { "iid": 5401, "fullName": "Amina Haddad" },
                "staff": { "staffId": 221, "fullName": "Dr. Selma Idrissi" },
                "insurance": { "insId": 2, "type": "CNSS" },
                "total": 2450,
                "prescription": {
                    "pid": 9901,
                    "medications": [
                        { "mid": 120, "name": "Atorvastatin 40mg", "dosage": "1 tablet", "duration": "30 days", "therapeuticClass": "Statin" },
                        { "mid": 218, "name": "Metoprolol 50mg", "dosage": "1 tablet", "duration": "30 days", "therapeuticClass": "Beta blocker" },
                    ],
                },
            },
            {
                "expId": 1047, "caid": 8121, "activityDate": "2025-11-10T14:30:00Z",
                "hospital": { "hid": 1, "name": "Casablanca Central" },
                "department": { "depId": 14, "name": "Oncology" },
                "patient": { "iid": 5402, "fullName": "Nabil Faridi" },
                "staff": { "staffId": 189, "fullName": "Dr. Amine Rahmouni" },
                "insurance": { "insId": 1, "type": "CNOPS" },
                "total": 3120,
                "prescription": {
                    "pid": 9900,
                    "medications": [
                        { "mid": 301, "name": "Chemotherapy pack", "dosage": "Cycle", "duration": "1 session", "therapeuticClass": "Chemotherapy" },
                    ],
                },
            },
            {
                "expId": 1046, "caid": 8045, "activityDate": "2025-11-08T08:05:00Z",
                "hospital": { "hid": 3, "name": "Tangier Regional" },
                "department": { "depId": 27, "name": "Emergency" },
                "patient": { "iid": 5210, "fullName": "Salma Outmane" },
                "staff": { "staffId": 205, "fullName": "Dr. Fadoua Kabbaj" },
                "insurance": { "insId": 4, "type": "Private" },
                "total": 5780,
                "prescription": null,
            },
        ],
        "medicationUtilization": [
            { "mid": 120, "name": "Atorvastatin 40mg", "therapeuticClass": "Statin", "prescriptions": 48, "share": 0.16 },
            { "mid": 218, "name": "Metoprolol 50mg", "therapeuticClass": "Beta blocker", "prescriptions": 42, "share": 0.14 },
            { "mid": 301, "name": "Chemotherapy pack", "therapeuticClass": "Chemotherapy", "prescriptions": 28, "share": 0.09 },
            { "mid": 402, "name": "Insulin Lispro", "therapeuticClass": "Endocrinology", "prescriptions": 24, "share": 0.08 },
            { "mid": 512, "name": "Omeprazole 20mg", "therapeuticClass": "Gastroenterology", "prescriptions": 20, "share": 0.07 },
        ],
        "metadata": {
            "filters": { "hospitalId": null, "departmentId": null, "insuranceId": null, "daysBack": 30 },
            "lastSyncedAt": now_rfc3339(),
        },
    })
}

type Snapshot = Arc<Mutex<Value>>;

struct BillingSnapshot {
    snapshot: Snapshot,
}

#[async_trait]
impl ResourceResolver for BillingSnapshot {
    async fn resolve(&self, _params: Params, _body: Option<Value>) -> Result<Value, BackendError> {
        let mut snapshot = self.snapshot.lock().await.clone();
        if let Some(metadata) = snapshot.get_mut("metadata") {
            metadata["lastSyncedAt"] = json!(now_rfc3339());
        }
        Ok(snapshot)
    }
}

struct ExpenseCapture {
    snapshot: Snapshot,
    next_exp_id: Arc<Mutex<i64>>,
}

#[async_trait]
impl ResourceResolver for ExpenseCapture {
    async fn resolve(&self, _params: Params, body: Option<Value>) -> Result<Value, BackendError> {
        let body = body_object(body)?;
        require_present(&body, &["caid", "total"])?;

        let exp_id = match body.get("expId") {
            Some(id) if !id.is_null() => id.clone(),
            _ => {
                let mut next = self.next_exp_id.lock().await;
                *next += 1;
                json!(*next)
            }
        };

        let insurance = match body.get("insId") {
            Some(ins_id) => json!({
                "insId": ins_id,
                "type": body.get("insuranceType").cloned().unwrap_or(json!("Insured")),
            }),
            None => json!({ "insId": null, "type": "Self-Pay" }),
        };

        let expense = json!({
            "expId": exp_id,
            "caid": body["caid"].clone(),
            "activityDate": body.get("activityDate").cloned().unwrap_or_else(|| json!(now_rfc3339())),
            "hospital": body.get("hospital").cloned().unwrap_or(json!({ "hid": 99, "name": "Unknown Hospital" })),
            "department": body.get("department").cloned().unwrap_or(json!({ "depId": 1, "name": "General" })),
            "patient": body.get("patient").cloned().unwrap_or(json!({ "iid": 0, "fullName": "Unknown Patient" })),
            "staff": body.get("staff").cloned().unwrap_or(json!({ "staffId": 0, "fullName": "Unknown Staff" })),
            "insurance": insurance,
            "total": number_or_zero(body.get("total")),
            "prescription": null,
        });

        let mut snapshot = self.snapshot.lock().await;
        if let Some(Value::Array(expenses)) = snapshot.get_mut("recentExpenses") {
            expenses.insert(0, expense.clone());
            expenses.truncate(RECENT_EXPENSES_CAP);
        }

        Ok(json!({
            "expense": expense,
            "message": "Expense captured via billing mock endpoint",
        }))
    }
}

pub async fn register(backend: &BackendConnector) -> Result<(), BackendError> {
    let snapshot: Snapshot = Arc::new(Mutex::new(seeded_snapshot()));
    backend
        .register_resource(
            "billing",
            Arc::new(BillingSnapshot {
                snapshot: Arc::clone(&snapshot),
            }),
            Method::Get,
        )
        .await?;
    backend
        .register_resource(
            "billing/expense",
            Arc::new(ExpenseCapture {
                snapshot,
                next_exp_id: Arc::new(Mutex::new(1048)),
            }),
            Method::Post,
        )
        .await?;
    Ok(())
}
