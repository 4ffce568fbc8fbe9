use crate::domain::{SignatureEntry, TransactionMetadata};
use crate::foundation::{ConclaveError, TxId};
use crate::infrastructure::remote::{CosigningService, RemoteConfirmation, RemoteRecord};
use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// In-memory co-signing service double.
///
/// Keeps one confirmation per owner (later replaces) and can be told to fail
/// calls touching a specific record, to exercise per-record batch failures.
pub struct MockCosigningService {
    inner: Mutex<HashMap<TxId, RemoteRecord>>,
    fail_tx: Mutex<Option<TxId>>,
}

impl MockCosigningService {
    pub fn new() -> Self {
        Self { inner: Mutex::new(HashMap::new()), fail_tx: Mutex::new(None) }
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, HashMap<TxId, RemoteRecord>>, ConclaveError> {
        self.inner.lock().map_err(|_| ConclaveError::storage_error("mock remote lock", "poisoned"))
    }

    /// Every subsequent call touching `id` fails with a network error.
    pub fn fail_calls_for(&self, id: TxId) {
        if let Ok(mut fail) = self.fail_tx.lock() {
            *fail = Some(id);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut fail) = self.fail_tx.lock() {
            *fail = None;
        }
    }

    fn check_failure(&self, id: &TxId) -> Result<(), ConclaveError> {
        let fail = self.fail_tx.lock().map_err(|_| ConclaveError::storage_error("mock remote lock", "poisoned"))?;
        if fail.as_ref() == Some(id) {
            return Err(ConclaveError::network_error("mock remote", format!("injected failure for {id}")));
        }
        Ok(())
    }

    /// Seed a proposal as if another party had pushed it.
    pub fn seed_record(&self, record: RemoteRecord) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.insert(record.tx_id, record);
        }
    }

    /// Inject a confirmation as if another owner had signed out-of-band.
    pub fn seed_confirmation(&self, id: &TxId, confirmation: RemoteConfirmation) -> Result<(), ConclaveError> {
        let mut inner = self.lock_inner()?;
        let record = inner.get_mut(id).ok_or_else(|| ConclaveError::RemoteNotFound(id.to_string()))?;
        upsert_confirmation(record, confirmation);
        Ok(())
    }

    pub fn record(&self, id: &TxId) -> Option<RemoteRecord> {
        self.inner.lock().ok().and_then(|inner| inner.get(id).cloned())
    }

    pub fn record_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.len()).unwrap_or(0)
    }
}

impl Default for MockCosigningService {
    fn default() -> Self {
        Self::new()
    }
}

fn upsert_confirmation(record: &mut RemoteRecord, confirmation: RemoteConfirmation) {
    match record.confirmations.iter_mut().find(|existing| existing.owner == confirmation.owner) {
        Some(existing) => *existing = confirmation,
        None => record.confirmations.push(confirmation),
    }
}

fn confirmation_from_entry(entry: &SignatureEntry) -> RemoteConfirmation {
    RemoteConfirmation { owner: entry.signer, payload: entry.payload.clone(), submitted_at_millis: entry.timestamp_millis }
}

#[async_trait]
impl CosigningService for MockCosigningService {
    async fn get_pending_for_account(&self, account: Address) -> Result<Vec<RemoteRecord>, ConclaveError> {
        let inner = self.lock_inner()?;
        let mut records: Vec<RemoteRecord> = inner.values().filter(|record| record.account == account).cloned().collect();
        records.sort_by_key(|record| record.tx_id);
        Ok(records)
    }

    async fn get_by_identifier(&self, id: &TxId) -> Result<Option<RemoteRecord>, ConclaveError> {
        self.check_failure(id)?;
        Ok(self.lock_inner()?.get(id).cloned())
    }

    async fn propose(
        &self,
        id: &TxId,
        account: Address,
        metadata: &TransactionMetadata,
        founding: &SignatureEntry,
        proposer: Address,
    ) -> Result<(), ConclaveError> {
        self.check_failure(id)?;
        let mut inner = self.lock_inner()?;
        match inner.get_mut(id) {
            Some(existing) => upsert_confirmation(existing, confirmation_from_entry(founding)),
            None => {
                inner.insert(
                    *id,
                    RemoteRecord {
                        tx_id: *id,
                        account,
                        metadata: metadata.clone(),
                        proposer: Some(proposer),
                        confirmations: vec![confirmation_from_entry(founding)],
                    },
                );
            }
        }
        Ok(())
    }

    async fn confirm(&self, id: &TxId, confirmation: &SignatureEntry) -> Result<(), ConclaveError> {
        self.check_failure(id)?;
        let mut inner = self.lock_inner()?;
        let record = inner.get_mut(id).ok_or_else(|| ConclaveError::RemoteNotFound(id.to_string()))?;
        upsert_confirmation(record, confirmation_from_entry(confirmation));
        Ok(())
    }
}
