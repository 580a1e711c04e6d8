//! Shared fixtures: an in-process metadata backend and mock wallet
//! provider / ledger contract implementations.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use cv_api_types::{AccountAddress, AlertSeverity, NewRecord, RecordEntry};
use cv_client::AlertSink;
use cv_provider::{
    ContractCoordinates, LedgerCallError, LedgerContract, ProviderError, ProviderSession,
    WalletProvider,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const GOOD_ADDRESS: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

pub fn full_abi() -> Value {
    json!([
        { "name": "store", "type": "function" },
        { "name": "get", "type": "function" },
        { "name": "listForOwner", "type": "function" },
        { "name": "verify", "type": "function" }
    ])
}

// ── alert capture ──

#[derive(Default)]
pub struct CapturingSink {
    pub alerts: Mutex<Vec<(AlertSeverity, String)>>,
}

impl CapturingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_severity(&self, severity: AlertSeverity) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl AlertSink for CapturingSink {
    fn alert(&self, severity: AlertSeverity, message: &str) {
        self.alerts
            .lock()
            .unwrap()
            .push((severity, message.to_owned()));
    }
}

// ── mock ledger contract ──

#[derive(Default)]
pub struct MockContract {
    pub fingerprints: Vec<String>,
    pub records: HashMap<String, RecordEntry>,
    pub verified: Mutex<Vec<String>>,
}

impl MockContract {
    pub fn with_records(entries: Vec<RecordEntry>) -> Self {
        let fingerprints = entries.iter().map(|e| e.fingerprint.0.clone()).collect();
        let records = entries
            .into_iter()
            .map(|e| (e.fingerprint.0.clone(), e))
            .collect();
        Self {
            fingerprints,
            records,
            verified: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LedgerContract for MockContract {
    async fn call(&self, method: &str, args: &[Value]) -> Result<Value, LedgerCallError> {
        match method {
            "listForOwner" => Ok(json!(self.fingerprints)),
            "get" => {
                let fingerprint = args
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                match self.records.get(fingerprint) {
                    Some(record) => Ok(serde_json::to_value(record).unwrap()),
                    None => Err(LedgerCallError::Call {
                        method: method.to_owned(),
                        reason: format!("unknown record {fingerprint}"),
                    }),
                }
            }
            other => Err(LedgerCallError::Call {
                method: other.to_owned(),
                reason: "unsupported".to_owned(),
            }),
        }
    }

    async fn send(
        &self,
        method: &str,
        args: &[Value],
        _from: &AccountAddress,
    ) -> Result<Value, LedgerCallError> {
        if method != "verify" {
            return Err(LedgerCallError::Call {
                method: method.to_owned(),
                reason: "unsupported".to_owned(),
            });
        }
        let fingerprint = args
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        self.verified.lock().unwrap().push(fingerprint);
        Ok(Value::Null)
    }

    fn has_method(&self, name: &str) -> bool {
        matches!(name, "store" | "get" | "listForOwner" | "verify")
    }
}

// ── mock wallet provider ──

pub struct MockProvider {
    pub present: bool,
    pub deny: bool,
    pub accounts: Vec<&'static str>,
    pub contract: Arc<MockContract>,
    /// Artificial delay before account authorization resolves, to hold a
    /// bootstrap attempt in flight.
    pub authorization_delay: Duration,
}

impl MockProvider {
    pub fn ready(contract: Arc<MockContract>) -> Arc<Self> {
        Arc::new(Self {
            present: true,
            deny: false,
            accounts: vec!["0xaaa0000000000000000000000000000000000aaa"],
            contract,
            authorization_delay: Duration::ZERO,
        })
    }

    pub fn absent() -> Arc<Self> {
        Arc::new(Self {
            present: false,
            deny: false,
            accounts: Vec::new(),
            contract: Arc::new(MockContract::default()),
            authorization_delay: Duration::ZERO,
        })
    }

    pub fn denying(contract: Arc<MockContract>) -> Arc<Self> {
        Arc::new(Self {
            present: true,
            deny: true,
            accounts: Vec::new(),
            contract,
            authorization_delay: Duration::ZERO,
        })
    }

    pub fn slow(contract: Arc<MockContract>, authorization_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            present: true,
            deny: false,
            accounts: vec!["0xaaa0000000000000000000000000000000000aaa"],
            contract,
            authorization_delay,
        })
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    fn detect(&self) -> bool {
        self.present
    }

    async fn request_accounts(&self) -> Result<Vec<AccountAddress>, ProviderError> {
        if !self.authorization_delay.is_zero() {
            tokio::time::sleep(self.authorization_delay).await;
        }
        if self.deny {
            return Err(ProviderError::AuthorizationDenied(
                "user rejected the request".to_owned(),
            ));
        }
        Ok(self
            .accounts
            .iter()
            .map(|a| AccountAddress((*a).to_owned()))
            .collect())
    }

    fn contract_handle(
        &self,
        _coordinates: &ContractCoordinates,
        _session: &ProviderSession,
    ) -> Result<Arc<dyn LedgerContract>, ProviderError> {
        Ok(Arc::clone(&self.contract) as Arc<dyn LedgerContract>)
    }
}

// ── in-process metadata backend ──

pub struct TestBackend {
    pub address: String,
    pub abi: Value,
    pub info_hits: AtomicUsize,
    /// Number of leading /api/contract/info requests to fail with a 500.
    pub fail_first: usize,
}

impl TestBackend {
    pub fn good() -> Arc<Self> {
        Arc::new(Self {
            address: GOOD_ADDRESS.to_owned(),
            abi: full_abi(),
            info_hits: AtomicUsize::new(0),
            fail_first: 0,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            address: GOOD_ADDRESS.to_owned(),
            abi: full_abi(),
            info_hits: AtomicUsize::new(0),
            fail_first: usize::MAX,
        })
    }

    pub fn hits(&self) -> usize {
        self.info_hits.load(Ordering::SeqCst)
    }
}

async fn contract_info(
    State(backend): State<Arc<TestBackend>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let hit = backend.info_hits.fetch_add(1, Ordering::SeqCst);
    if hit < backend.fail_first {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "contract registry unavailable" })),
        ));
    }
    Ok(Json(json!({ "address": backend.address, "abi": backend.abi })))
}

async fn create_record(Json(record): Json<NewRecord>) -> (StatusCode, Json<Value>) {
    let mut stored = serde_json::to_value(&record).unwrap();
    stored["id"] = json!("rec-1");
    stored["fingerprint"] = json!("0xfeedbead");
    stored["status"] = json!("PENDING");
    stored["createdAtEpochMs"] = json!(1_700_000_000_000_u64);
    stored["updatedAtEpochMs"] = json!(1_700_000_000_000_u64);
    (StatusCode::CREATED, Json(stored))
}

async fn verify_record(
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::extract::Form(form): axum::extract::Form<HashMap<String, String>>,
) -> Result<StatusCode, (StatusCode, String)> {
    if id != "rec-1" {
        return Err((StatusCode::NOT_FOUND, "record not found".to_owned()));
    }
    match form.get("status").map(String::as_str) {
        Some("PENDING") | Some("VERIFIED") | Some("REJECTED") => Ok(StatusCode::OK),
        _ => Err((StatusCode::BAD_REQUEST, "unknown status".to_owned())),
    }
}

/// Serve the test backend on an ephemeral port and return its base URL.
pub async fn serve(backend: Arc<TestBackend>) -> String {
    let app = Router::new()
        .route("/api/contract/info", get(contract_info))
        .route("/api/resumes", axum::routing::post(create_record))
        .route("/api/resumes/{id}/verify", axum::routing::post(verify_record))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn record(fingerprint: &str, name: &str) -> RecordEntry {
    RecordEntry {
        name: name.to_owned(),
        email: format!("{name}@example.com"),
        education: "BSc".to_owned(),
        work_experience: "engineer".to_owned(),
        skills: "rust".to_owned(),
        phone: String::new(),
        fingerprint: cv_api_types::Fingerprint(fingerprint.to_owned()),
        timestamp: 1_700_000_000,
    }
}
