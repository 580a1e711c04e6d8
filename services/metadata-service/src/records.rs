use axum::{
    Json,
    extract::{Form, Path, State},
    http::StatusCode,
};
use cv_api_types::{Fingerprint, NewRecord, RecordStatus, StoredRecord};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, MessageResponse, record_error};

pub(crate) async fn create_record(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewRecord>,
) -> Result<(StatusCode, Json<StoredRecord>), (StatusCode, Json<MessageResponse>)> {
    if let Err(err) = request.validate() {
        return Err(record_error(StatusCode::BAD_REQUEST, err.to_string()));
    }

    let now = epoch_ms();
    let record = StoredRecord {
        id: Uuid::new_v4().to_string(),
        fingerprint: fingerprint_for(&request, now),
        status: RecordStatus::Pending,
        verification_notes: None,
        created_at_epoch_ms: now,
        updated_at_epoch_ms: now,
        record: request,
    };

    info!(
        "record {} created with fingerprint {}",
        record.id, record.fingerprint.0
    );
    state.store.insert(record.clone()).await;

    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn list_records(State(state): State<Arc<AppState>>) -> Json<Vec<StoredRecord>> {
    Json(state.store.list().await)
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyForm {
    status: String,
    #[serde(rename = "verificationNotes", default)]
    verification_notes: String,
}

/// Reviewer verification. Success is the HTTP status; failures are plain
/// text, which is what the form-posting client expects.
pub(crate) async fn verify_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<VerifyForm>,
) -> Result<Json<StoredRecord>, (StatusCode, String)> {
    let Some(status) = RecordStatus::parse(&form.status) else {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("unknown status: {}", form.status),
        ));
    };

    match state
        .store
        .set_status(&id, status, form.verification_notes, epoch_ms())
        .await
    {
        Some(updated) => {
            info!("record {} marked {}", updated.id, status.as_str());
            Ok(Json(updated))
        }
        None => Err((StatusCode::NOT_FOUND, "record not found".to_owned())),
    }
}

/// SHA-256 over the record content plus creation time, hex with the usual
/// 0x prefix. Stands in for the hash the ledger assigns on-chain.
fn fingerprint_for(record: &NewRecord, created_at_epoch_ms: u128) -> Fingerprint {
    let content = format!(
        "{}|{}|{}|{}|{}|{}",
        record.name,
        record.email,
        record.education,
        record.work_experience,
        record.skills,
        created_at_epoch_ms,
    );
    let digest = Sha256::digest(content.as_bytes());
    Fingerprint(format!("0x{}", to_hex(&digest)))
}

fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

fn to_hex(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len() * 2);
    for byte in input {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
