//! Shared mutation logic over an insertion-ordered record collection.
//!
//! Both store backends delegate here so the merge rule and the status state
//! machine are enforced in exactly one place.

use crate::domain::status::{ensure_valid_transition, is_terminal};
use crate::domain::{ExecutionReference, MergeOutcome, SignatureEntry, TransactionMetadata, TransactionRecord, TxStatus};
use crate::foundation::{now_millis, ChainId, ConclaveError, TxId};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Optional listing filter.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordFilter {
    pub status: Option<TxStatus>,
}

impl RecordFilter {
    pub fn with_status(status: TxStatus) -> Self {
        Self { status: Some(status) }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.status.map_or(true, |status| record.status == status)
    }
}

/// The whole persisted collection; every mutation is a read-modify-write
/// over it.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RecordCollection {
    pub records: Vec<TransactionRecord>,
}

impl RecordCollection {
    pub fn get(&self, id: &TxId) -> Option<&TransactionRecord> {
        self.records.iter().find(|record| &record.tx_id == id)
    }

    fn get_mut(&mut self, id: &TxId) -> Option<&mut TransactionRecord> {
        self.records.iter_mut().find(|record| &record.tx_id == id)
    }

    pub fn list(&self, filter: RecordFilter) -> Vec<TransactionRecord> {
        self.records.iter().filter(|record| filter.matches(record)).cloned().collect()
    }

    pub fn create(
        &mut self,
        id: TxId,
        account: Address,
        chain_id: ChainId,
        metadata: TransactionMetadata,
        creator: Address,
    ) -> Result<TransactionRecord, ConclaveError> {
        if self.get(&id).is_some() {
            return Err(ConclaveError::DuplicateRecord(id.to_string()));
        }
        let record = TransactionRecord::new(id, account, chain_id, metadata, creator, now_millis());
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn add_signature(&mut self, id: &TxId, entry: SignatureEntry) -> Result<MergeOutcome, ConclaveError> {
        let record = self.get_mut(id).ok_or_else(|| ConclaveError::record_not_found(id))?;
        if is_terminal(record.status) {
            return Err(ConclaveError::terminal_record(id, record.status));
        }
        Ok(record.merge_signature(entry))
    }

    /// Setting Executed stamps the execution timestamp and stores the
    /// on-chain reference.
    pub fn set_status(
        &mut self,
        id: &TxId,
        status: TxStatus,
        executed_ref: Option<alloy_primitives::B256>,
    ) -> Result<TransactionRecord, ConclaveError> {
        let record = self.get_mut(id).ok_or_else(|| ConclaveError::record_not_found(id))?;
        if is_terminal(record.status) {
            return Err(ConclaveError::terminal_record(id, record.status));
        }
        ensure_valid_transition(record.status, status)?;
        record.status = status;
        if status == TxStatus::Executed {
            record.execution = executed_ref.map(|tx_hash| ExecutionReference { tx_hash, executed_at_millis: now_millis() });
        }
        Ok(record.clone())
    }

    /// Idempotent: removing an absent id is not an error.
    pub fn remove(&mut self, id: &TxId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| &record.tx_id != id);
        self.records.len() != before
    }
}
