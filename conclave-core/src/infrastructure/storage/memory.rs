use crate::domain::{MergeOutcome, SignatureEntry, TransactionMetadata, TransactionRecord, TxStatus};
use crate::foundation::{ChainId, ConclaveError, TxId};
use crate::infrastructure::storage::{RecordCollection, RecordFilter, TransactionStore};
use alloy_primitives::{Address, B256};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory store with the same semantics as the file store. Test double and
/// dry-run backend.
pub struct MemoryTransactionStore {
    inner: Arc<Mutex<RecordCollection>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(RecordCollection::default())) }
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, RecordCollection>, ConclaveError> {
        self.inner.lock().map_err(|_| ConclaveError::storage_error("memory store lock", "poisoned"))
    }
}

impl Default for MemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore for MemoryTransactionStore {
    fn create_record(
        &self,
        id: TxId,
        account: Address,
        chain_id: ChainId,
        metadata: TransactionMetadata,
        creator: Address,
    ) -> Result<TransactionRecord, ConclaveError> {
        self.lock_inner()?.create(id, account, chain_id, metadata, creator)
    }

    fn get_record(&self, id: &TxId) -> Result<Option<TransactionRecord>, ConclaveError> {
        Ok(self.lock_inner()?.get(id).cloned())
    }

    fn list_records(&self, filter: RecordFilter) -> Result<Vec<TransactionRecord>, ConclaveError> {
        Ok(self.lock_inner()?.list(filter))
    }

    fn add_signature(&self, id: &TxId, entry: SignatureEntry) -> Result<MergeOutcome, ConclaveError> {
        self.lock_inner()?.add_signature(id, entry)
    }

    fn set_status(&self, id: &TxId, status: TxStatus, executed_ref: Option<B256>) -> Result<TransactionRecord, ConclaveError> {
        self.lock_inner()?.set_status(id, status, executed_ref)
    }

    fn remove_record(&self, id: &TxId) -> Result<(), ConclaveError> {
        self.lock_inner()?.remove(id);
        Ok(())
    }
}
