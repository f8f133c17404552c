//! In-process stub of the wallet REST API

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use escalation_desk::models::types::{FreezeRequest, UnfreezeRequest};
use escalation_desk::{DeskConfig, EvidenceItem, Wallet, WalletApiClient};

pub const ACTIVE_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
pub const FROZEN_ADDRESS: &str = "0x8589427373D6D84E98730D7795D8f6f8731FDA16";
pub const UNFROZEN_ADDRESS: &str = "0x19aa5Fe80D33a56D56c78e82eA5E50E5d80b4Dff";

/// Wallet row plus the aggregate the search endpoint returns for it
pub struct StubRecord {
    pub wallet: Wallet,
    pub risk_score: u8,
    pub ml_tags: Vec<String>,
    pub evidence: Vec<EvidenceItem>,
}

#[derive(Default)]
pub struct Counters {
    pub search: AtomicUsize,
    pub freeze: AtomicUsize,
    pub unfreeze: AtomicUsize,
    pub frozen_list: AtomicUsize,
    pub unfrozen_list: AtomicUsize,
}

pub struct StubBackend {
    pub records: Mutex<Vec<StubRecord>>,
    pub calls: Counters,
    /// Answer list endpoints with 500
    pub fail_lists: AtomicBool,
    /// Answer search with 500
    pub fail_search: AtomicBool,
}

impl StubBackend {
    pub fn seeded() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(seed_records()),
            calls: Counters::default(),
            fail_lists: AtomicBool::new(false),
            fail_search: AtomicBool::new(false),
        })
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn wallet(&self, id: i64) -> Wallet {
        let records = self.records.lock().unwrap();
        records
            .iter()
            .find(|r| r.wallet.id == id)
            .map(|r| r.wallet.clone())
            .unwrap()
    }
}

fn wallet(value: Value) -> Wallet {
    serde_json::from_value(value).unwrap()
}

fn evidence(id: i64, evidence_id: &str, title: &str) -> EvidenceItem {
    serde_json::from_value(json!({
        "id": id,
        "evidence_id": evidence_id,
        "title": title,
        "description": format!("Linked to {}", ACTIVE_ADDRESS),
        "hash": format!("sha256:{:064x}", id),
        "uploaded_by": "Inspector Rao",
        "created_at": "2024-01-18T09:15:00"
    }))
    .unwrap()
}

fn seed_records() -> Vec<StubRecord> {
    vec![
        StubRecord {
            wallet: wallet(json!({
                "id": 42,
                "address": ACTIVE_ADDRESS,
                "risk_level": "high",
                "is_frozen": false,
                "created_at": "2024-01-10T08:00:00"
            })),
            risk_score: 87,
            ml_tags: vec!["mixer_interaction".into(), "rapid_transfers".into()],
            evidence: vec![
                evidence(101, "EV-2024-001", "Exchange KYC records"),
                evidence(102, "EV-2024-002", "Victim bank statement"),
            ],
        },
        StubRecord {
            wallet: wallet(json!({
                "id": 7,
                "address": FROZEN_ADDRESS,
                "risk_level": "critical",
                "is_frozen": true,
                "frozen_by": "det.smith@cybercrime.gov",
                "freeze_reason": "Ransomware proceeds",
                "frozen_at": "2024-01-19T10:30:00"
            })),
            risk_score: 95,
            ml_tags: vec!["ransomware".into()],
            evidence: Vec::new(),
        },
        StubRecord {
            wallet: wallet(json!({
                "id": 9,
                "address": UNFROZEN_ADDRESS,
                "risk_level": "low",
                "is_frozen": false,
                "unfrozen_by": "inspector.white@cybercrime.gov",
                "unfreeze_reason": "Owner verified",
                "unfrozen_at": "2024-01-15T14:00:00"
            })),
            risk_score: 12,
            ml_tags: Vec::new(),
            evidence: Vec::new(),
        },
    ]
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn search(State(stub): State<Arc<StubBackend>>, Path(address): Path<String>) -> Response {
    stub.calls.search.fetch_add(1, Ordering::SeqCst);
    if stub.fail_search.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    let records = stub.records.lock().unwrap();
    match records.iter().find(|r| r.wallet.address == address) {
        Some(r) => Json(json!({
            "wallet": r.wallet,
            "risk_score": r.risk_score,
            "ml_tags": r.ml_tags,
            "complaints": [],
            "incident_reports": [],
            "evidence": r.evidence,
            "complaints_count": 0,
            "incident_reports_count": 1,
            "evidence_count": r.evidence.len(),
            "fraud_analysis": null
        }))
        .into_response(),
        None => detail(StatusCode::NOT_FOUND, "Wallet not found"),
    }
}

async fn freeze(
    State(stub): State<Arc<StubBackend>>,
    Path(id): Path<i64>,
    Json(request): Json<FreezeRequest>,
) -> Response {
    stub.calls.freeze.fetch_add(1, Ordering::SeqCst);
    let mut records = stub.records.lock().unwrap();
    let Some(record) = records.iter_mut().find(|r| r.wallet.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Wallet not found");
    };
    let w = &mut record.wallet;
    if w.is_frozen {
        return detail(StatusCode::BAD_REQUEST, "Wallet is already frozen");
    }
    w.is_frozen = true;
    w.frozen_by = Some(request.frozen_by);
    w.freeze_reason = Some(request.freeze_reason);
    w.frozen_at = Some(Utc::now().naive_utc());
    w.unfrozen_by = None;
    w.unfreeze_reason = None;
    w.unfrozen_at = None;

    Json(json!({
        "id": w.id,
        "address": w.address,
        "is_frozen": w.is_frozen,
        "frozen_by": w.frozen_by,
        "freeze_reason": w.freeze_reason,
        "frozen_at": w.frozen_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
    }))
    .into_response()
}

async fn unfreeze(
    State(stub): State<Arc<StubBackend>>,
    Path(id): Path<i64>,
    Json(request): Json<UnfreezeRequest>,
) -> Response {
    stub.calls.unfreeze.fetch_add(1, Ordering::SeqCst);
    let mut records = stub.records.lock().unwrap();
    let Some(record) = records.iter_mut().find(|r| r.wallet.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Wallet not found");
    };
    let w = &mut record.wallet;
    if !w.is_frozen {
        return detail(StatusCode::BAD_REQUEST, "Wallet is not frozen");
    }
    w.is_frozen = false;
    w.unfrozen_by = Some(request.unfrozen_by);
    w.unfreeze_reason = Some(request.unfreeze_reason);
    w.unfrozen_at = Some(Utc::now().naive_utc());

    Json(json!({
        "id": w.id,
        "address": w.address,
        "is_frozen": w.is_frozen,
        "unfrozen_by": w.unfrozen_by,
        "unfreeze_reason": w.unfreeze_reason,
        "unfrozen_at": w.unfrozen_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
    }))
    .into_response()
}

async fn frozen_list(State(stub): State<Arc<StubBackend>>) -> Response {
    stub.calls.frozen_list.fetch_add(1, Ordering::SeqCst);
    if stub.fail_lists.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    let records = stub.records.lock().unwrap();
    let rows: Vec<Value> = records
        .iter()
        .filter(|r| r.wallet.is_frozen)
        .map(|r| {
            json!({
                "id": r.wallet.id,
                "address": r.wallet.address,
                "risk_score": probability(r.risk_score),
                "frozen_by": r.wallet.frozen_by,
                "freeze_reason": r.wallet.freeze_reason,
                "frozen_at": r.wallet.frozen_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            })
        })
        .collect();
    Json(rows).into_response()
}

/// List endpoints report the model probability rather than the 0-100 score
fn probability(score: u8) -> f64 {
    f64::from(score) / 100.0
}

async fn unfrozen_list(State(stub): State<Arc<StubBackend>>) -> Response {
    stub.calls.unfrozen_list.fetch_add(1, Ordering::SeqCst);
    if stub.fail_lists.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    let records = stub.records.lock().unwrap();
    let rows: Vec<Value> = records
        .iter()
        .filter(|r| !r.wallet.is_frozen && r.wallet.unfrozen_at.is_some())
        .map(|r| {
            json!({
                "id": r.wallet.id,
                "address": r.wallet.address,
                "risk_score": probability(r.risk_score),
                "unfrozen_by": r.wallet.unfrozen_by,
                "unfreeze_reason": r.wallet.unfreeze_reason,
                "unfrozen_at": r.wallet.unfrozen_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            })
        })
        .collect();
    Json(rows).into_response()
}

pub fn router(stub: Arc<StubBackend>) -> Router {
    Router::new()
        .route("/api/v1/wallets/search/:address", get(search))
        .route("/api/v1/wallets/frozen/list", get(frozen_list))
        .route("/api/v1/wallets/unfrozen/list", get(unfrozen_list))
        .route("/api/v1/wallets/:id/freeze", post(freeze))
        .route("/api/v1/wallets/:id/unfreeze", post(unfreeze))
        .with_state(stub)
}

/// Serve the stub on an ephemeral port; returns the API base URL
pub async fn spawn(stub: Arc<StubBackend>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(stub)).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

/// Seeded stub plus a client pointed at it
pub async fn start() -> (Arc<StubBackend>, WalletApiClient) {
    let stub = StubBackend::seeded();
    let base_url = spawn(stub.clone()).await;
    let config = DeskConfig::default().with_base_url(base_url);
    let client = WalletApiClient::new(&config).unwrap();
    (stub, client)
}
