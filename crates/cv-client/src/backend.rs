//! HTTP client for the metadata backend.
//!
//! The backend is a trust boundary: it serves the contract coordinates and
//! owns record creation; we never assume its failure bodies are well formed.

use cv_abi::RawAbi;
use cv_api_types::{NewRecord, RecordStatus, StoredRecord};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("metadata backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("metadata backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// `GET /api/contract/info` payload: contract address plus the ABI, which
/// may arrive structured or as a string.
#[derive(Debug, Deserialize)]
pub struct ContractInfo {
    pub address: String,
    pub abi: RawAbi,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    endpoint: String,
    http: reqwest::Client,
}

impl BackendClient {
    /// Endpoint precedence: explicit argument, then `CV_METADATA_URL`,
    /// then same-host default.
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("CV_METADATA_URL").ok())
            .unwrap_or_else(|| "http://localhost:8080".to_owned());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn contract_info(&self) -> Result<ContractInfo, BackendError> {
        let url = format!("{}/api/contract/info", self.endpoint);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            // best-effort decode of an { "error": ... } body
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status_text(status));
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    pub async fn create_record(&self, record: &NewRecord) -> Result<StoredRecord, BackendError> {
        let url = format!("{}/api/resumes", self.endpoint);
        let response = self.http.post(&url).json(record).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status_text(status));
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Backend-side verification. Success is signaled by HTTP status only;
    /// failure bodies are plain text.
    pub async fn verify_record(
        &self,
        id: &str,
        status: RecordStatus,
        notes: &str,
    ) -> Result<(), BackendError> {
        let url = format!("{}/api/resumes/{}/verify", self.endpoint, id);
        let response = self
            .http
            .post(&url)
            .form(&[("status", status.as_str()), ("verificationNotes", notes)])
            .send()
            .await?;

        let http_status = response.status();
        if !http_status.is_success() {
            let message = match response.text().await {
                Ok(text) if !text.trim().is_empty() => text,
                _ => status_text(http_status),
            };
            return Err(BackendError::Status {
                status: http_status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_owned()
}
