use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AccountAddress(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractAddress(pub String);

impl ContractAddress {
    /// The all-zero address some deployments hand out before the contract
    /// is actually deployed. Never a valid binding target.
    pub const SENTINEL: &'static str = "0x0000000000000000000000000000000000000000";

    pub fn is_sentinel(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::SENTINEL)
    }
}

/// Content-derived identifier assigned to a record by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub String);

/// Severity classes for user-visible banners. Expiry and dismissal are the
/// rendering layer's concern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Success,
    Warning,
    Danger,
}

/// A record as submitted by the form layer. Fingerprint and timestamps are
/// assigned remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub name: String,
    pub email: String,
    pub education: String,
    pub work_experience: String,
    pub skills: String,
    #[serde(default)]
    pub phone: String,
}

/// A record as read back from the ledger contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntry {
    pub name: String,
    pub email: String,
    pub education: String,
    pub work_experience: String,
    pub skills: String,
    #[serde(default)]
    pub phone: String,
    pub fingerprint: Fingerprint,
    /// Seconds since epoch, assigned by the ledger on submission.
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending,
    Verified,
    Rejected,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "PENDING",
            RecordStatus::Verified => "VERIFIED",
            RecordStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(RecordStatus::Pending),
            "VERIFIED" => Some(RecordStatus::Verified),
            "REJECTED" => Some(RecordStatus::Rejected),
            _ => None,
        }
    }
}

/// A record held by the metadata backend, echoed back on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: String,
    #[serde(flatten)]
    pub record: NewRecord,
    pub fingerprint: Fingerprint,
    pub status: RecordStatus,
    #[serde(default)]
    pub verification_notes: Option<String>,
    pub created_at_epoch_ms: u128,
    pub updated_at_epoch_ms: u128,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Missing(&'static str),
    #[error("{field} must not exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("email address is malformed")]
    InvalidEmail,
}

const MAX_NAME: usize = 50;
const MAX_EMAIL: usize = 100;
const MAX_EDUCATION: usize = 1000;
const MAX_WORK_EXPERIENCE: usize = 2000;
const MAX_SKILLS: usize = 1000;

impl NewRecord {
    /// Form-layer validation. The record gateway passes entries through
    /// untouched; the metadata backend re-checks on its side.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, MAX_NAME)?;
        required("email", &self.email, MAX_EMAIL)?;
        required("education", &self.education, MAX_EDUCATION)?;
        required("workExperience", &self.work_experience, MAX_WORK_EXPERIENCE)?;
        required("skills", &self.skills, MAX_SKILLS)?;

        // local-part '@' domain, nothing fancier
        let mut parts = self.email.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(())
    }
}

fn required(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
