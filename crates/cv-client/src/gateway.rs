//! The narrow record operation surface consumed by the view layer.

use crate::backend::{BackendClient, BackendError};
use crate::bootstrap::LedgerBootstrap;
use cv_api_types::{Fingerprint, NewRecord, RecordEntry, RecordStatus, StoredRecord};
use cv_provider::{ContractHandle, LedgerCallError, ProviderError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("ledger client not ready; initialization retry in progress")]
    NotReady,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Ledger(#[from] LedgerCallError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub struct RecordGateway {
    bootstrap: Arc<LedgerBootstrap>,
    backend: BackendClient,
}

impl RecordGateway {
    pub fn new(bootstrap: Arc<LedgerBootstrap>, backend: BackendClient) -> Self {
        Self { bootstrap, backend }
    }

    /// All operations need a `Ready` handle. When it is absent we kick off
    /// a background bootstrap and report not-ready instead of blocking the
    /// caller on wallet dialogs.
    async fn ready_handle(&self) -> Result<Arc<ContractHandle>, GatewayError> {
        if let Some(handle) = self.bootstrap.handle().await {
            return Ok(handle);
        }

        if !self.bootstrap.provider_detected() {
            return Err(GatewayError::Provider(ProviderError::NoProvider));
        }

        self.bootstrap.trigger();
        Err(GatewayError::NotReady)
    }

    /// Record creation goes through the metadata backend; the ledger path
    /// only serves listing and verification. Field validation is the form
    /// layer's job and is not repeated here.
    pub async fn submit(&self, record: &NewRecord) -> Result<StoredRecord, GatewayError> {
        self.ready_handle().await?;

        let stored = self.backend.create_record(record).await?;
        info!(
            "record {} submitted with fingerprint {}",
            stored.id, stored.fingerprint.0
        );
        Ok(stored)
    }

    /// Fingerprints the ledger attributes to the session identity. An empty
    /// list is a valid result.
    pub async fn list_for_owner(&self) -> Result<Vec<Fingerprint>, GatewayError> {
        let handle = self.ready_handle().await?;
        let owner = handle.session().account.clone();
        Ok(handle.list_for_owner(&owner).await?)
    }

    /// Full records for the session identity, in listing order. A failed
    /// item is logged and omitted; one corrupt record must not hide the
    /// rest.
    pub async fn list_records(&self) -> Result<Vec<RecordEntry>, GatewayError> {
        let handle = self.ready_handle().await?;
        let owner = handle.session().account.clone();
        let fingerprints = handle.list_for_owner(&owner).await?;

        let mut records = Vec::with_capacity(fingerprints.len());
        for fingerprint in fingerprints {
            match handle.get_record(&fingerprint).await {
                Ok(record) => records.push(record),
                Err(err) => warn!("failed to fetch record {}: {err}", fingerprint.0),
            }
        }
        Ok(records)
    }

    pub async fn fetch(&self, fingerprint: &Fingerprint) -> Result<RecordEntry, GatewayError> {
        let handle = self.ready_handle().await?;
        Ok(handle.get_record(fingerprint).await?)
    }

    /// On-ledger verification, signed by the bound identity.
    pub async fn verify(&self, fingerprint: &Fingerprint) -> Result<(), GatewayError> {
        let handle = self.ready_handle().await?;
        handle.verify(fingerprint).await?;
        info!("record {} verified on ledger", fingerprint.0);
        Ok(())
    }

    /// Metadata-side verification with reviewer status and notes.
    pub async fn verify_metadata(
        &self,
        id: &str,
        status: RecordStatus,
        notes: &str,
    ) -> Result<(), GatewayError> {
        self.ready_handle().await?;
        Ok(self.backend.verify_record(id, status, notes).await?)
    }
}
