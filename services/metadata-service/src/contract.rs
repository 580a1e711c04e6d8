use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use tracing::{error, info};

use crate::{AppState, ErrorResponse, contract_error};

/// Serve the contract coordinates: configured address plus the ABI read
/// out of the compiled contract artifact. Clients treat this response as a
/// trust boundary and re-validate the ABI on their side.
pub(crate) async fn contract_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    let raw = fs::read_to_string(&state.artifact_path).map_err(|err| {
        error!("failed to read contract artifact {}: {err}", state.artifact_path);
        contract_error(format!("failed to retrieve contract info: {err}"))
    })?;

    let artifact: Value = serde_json::from_str(&raw).map_err(|err| {
        error!("contract artifact {} is not valid JSON: {err}", state.artifact_path);
        contract_error(format!("failed to retrieve contract info: {err}"))
    })?;

    let abi = artifact
        .get("abi")
        .cloned()
        .ok_or_else(|| contract_error("contract artifact has no abi section".to_owned()))?;

    info!(
        "contract info served for {} ({} ABI entries)",
        state.contract_address,
        abi.as_array().map(Vec::len).unwrap_or_default(),
    );

    Ok(Json(json!({
        "address": state.contract_address,
        "abi": abi,
    })))
}
