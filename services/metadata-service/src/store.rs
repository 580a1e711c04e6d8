use cv_api_types::{RecordStatus, StoredRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory record store. The ledger, not this service, is the durable
/// source of truth; this only backs the metadata endpoints.
#[derive(Default)]
pub(crate) struct RecordStore {
    records: RwLock<HashMap<String, StoredRecord>>,
}

impl RecordStore {
    pub(crate) async fn insert(&self, record: StoredRecord) {
        let mut guard = self.records.write().await;
        guard.insert(record.id.clone(), record);
    }

    pub(crate) async fn list(&self) -> Vec<StoredRecord> {
        let guard = self.records.read().await;
        let mut records: Vec<StoredRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.created_at_epoch_ms.cmp(&a.created_at_epoch_ms));
        records
    }

    /// Update status and notes, returning the updated record, or `None` if
    /// the id is unknown.
    pub(crate) async fn set_status(
        &self,
        id: &str,
        status: RecordStatus,
        notes: String,
        now_epoch_ms: u128,
    ) -> Option<StoredRecord> {
        let mut guard = self.records.write().await;
        let record = guard.get_mut(id)?;
        record.status = status;
        record.verification_notes = if notes.trim().is_empty() {
            None
        } else {
            Some(notes)
        };
        record.updated_at_epoch_ms = now_epoch_ms;
        Some(record.clone())
    }
}
