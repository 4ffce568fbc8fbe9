use crate::domain::{MergeOutcome, SignatureEntry, TransactionMetadata, TransactionRecord, TxStatus};
use crate::foundation::{ChainId, ConclaveError, TxId, TRANSACTIONS_FILE_PREFIX};
use crate::infrastructure::storage::{RecordCollection, RecordFilter, TransactionStore};
use alloy_primitives::{Address, B256};
use std::path::{Path, PathBuf};

/// JSON-file-backed store, one file per (chain, account) pair.
///
/// Each mutation loads the whole collection, applies the change and atomically
/// rewrites the file (temp file + rename).
pub struct FileTransactionStore {
    path: PathBuf,
}

impl FileTransactionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional per-account collection path inside the data directory.
    pub fn for_account(data_dir: &Path, chain_id: ChainId, account: Address) -> Self {
        let file = format!("{}-{}-{}.json", TRANSACTIONS_FILE_PREFIX, chain_id, account.to_checksum(None).to_lowercase());
        Self::new(data_dir.join(file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<RecordCollection, ConclaveError> {
        if !self.path.exists() {
            return Ok(RecordCollection::default());
        }
        let data = std::fs::read(&self.path)
            .map_err(|e| ConclaveError::storage_error("read transaction collection", e.to_string()))?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn persist(&self, collection: &RecordCollection) -> Result<(), ConclaveError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConclaveError::storage_error("create data directory", e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(collection)?;
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, &bytes)
            .map_err(|e| ConclaveError::storage_error("write transaction collection", e.to_string()))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| ConclaveError::storage_error("rename transaction collection", e.to_string()))?;
        Ok(())
    }
}

impl TransactionStore for FileTransactionStore {
    fn create_record(
        &self,
        id: TxId,
        account: Address,
        chain_id: ChainId,
        metadata: TransactionMetadata,
        creator: Address,
    ) -> Result<TransactionRecord, ConclaveError> {
        let mut collection = self.load()?;
        let record = collection.create(id, account, chain_id, metadata, creator)?;
        self.persist(&collection)?;
        Ok(record)
    }

    fn get_record(&self, id: &TxId) -> Result<Option<TransactionRecord>, ConclaveError> {
        Ok(self.load()?.get(id).cloned())
    }

    fn list_records(&self, filter: RecordFilter) -> Result<Vec<TransactionRecord>, ConclaveError> {
        Ok(self.load()?.list(filter))
    }

    fn add_signature(&self, id: &TxId, entry: SignatureEntry) -> Result<MergeOutcome, ConclaveError> {
        let mut collection = self.load()?;
        let outcome = collection.add_signature(id, entry)?;
        if outcome.changed() {
            self.persist(&collection)?;
        }
        Ok(outcome)
    }

    fn set_status(&self, id: &TxId, status: TxStatus, executed_ref: Option<B256>) -> Result<TransactionRecord, ConclaveError> {
        let mut collection = self.load()?;
        let record = collection.set_status(id, status, executed_ref)?;
        self.persist(&collection)?;
        Ok(record)
    }

    fn remove_record(&self, id: &TxId) -> Result<(), ConclaveError> {
        let mut collection = self.load()?;
        if collection.remove(id) {
            self.persist(&collection)?;
        }
        Ok(())
    }
}
