mod contract;
mod records;
mod store;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use cv_api_types::ContractAddress;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

/// Failure body for the contract endpoint.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Failure body for the record endpoints.
#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

pub(crate) struct AppState {
    store: store::RecordStore,
    contract_address: String,
    artifact_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let contract_address = std::env::var("CV_CONTRACT_ADDRESS")
        .unwrap_or_else(|_| ContractAddress::SENTINEL.to_owned());
    if contract_address == ContractAddress::SENTINEL {
        warn!("CV_CONTRACT_ADDRESS is unset; serving the zero sentinel address");
    }

    let state = Arc::new(AppState {
        store: store::RecordStore::default(),
        contract_address,
        artifact_path: std::env::var("CV_CONTRACT_ARTIFACT")
            .unwrap_or_else(|_| "artifacts/RecordRegistry.json".to_owned()),
    });

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    info!("metadata-service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/api/contract/info", get(contract::contract_info))
        .route(
            "/api/resumes",
            post(records::create_record).get(records::list_records),
        )
        .route("/api/resumes/{id}/verify", post(records::verify_record))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "metadata-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "metadata-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn contract_error(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
}

fn record_error(status: StatusCode, message: String) -> (StatusCode, Json<MessageResponse>) {
    (status, Json(MessageResponse { message }))
}
