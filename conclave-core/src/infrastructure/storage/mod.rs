//! Transaction store: a durable keyed collection of transaction records.
//!
//! Every mutation is a read-modify-write over the whole persisted collection,
//! so the store is effectively single-writer per process. Two concurrent
//! invocations mutating the same collection race last-writer-wins; that is an
//! accepted limitation of a single-operator tool, not something the store
//! masks. A hardened deployment should add file locking.

mod collection;
mod file;
mod memory;

pub use collection::{RecordCollection, RecordFilter};
pub use file::FileTransactionStore;
pub use memory::MemoryTransactionStore;

use crate::domain::{MergeOutcome, SignatureEntry, TransactionMetadata, TransactionRecord, TxStatus};
use crate::foundation::{ChainId, ConclaveError, TxId};
use alloy_primitives::{Address, B256};

pub type Result<T> = std::result::Result<T, ConclaveError>;

pub trait TransactionStore: Send + Sync {
    /// Create a new Pending record. Fails `DuplicateRecord` if the id exists.
    fn create_record(
        &self,
        id: TxId,
        account: Address,
        chain_id: ChainId,
        metadata: TransactionMetadata,
        creator: Address,
    ) -> Result<TransactionRecord>;

    fn get_record(&self, id: &TxId) -> Result<Option<TransactionRecord>>;

    /// Insertion-ordered snapshot.
    fn list_records(&self, filter: RecordFilter) -> Result<Vec<TransactionRecord>>;

    /// Merge a signature under the replace rule. Fails `RecordNotFound` for an
    /// unknown id and `TerminalRecord` for Executed/Rejected records.
    fn add_signature(&self, id: &TxId, entry: SignatureEntry) -> Result<MergeOutcome>;

    /// Drive the status state machine. Setting Executed stamps the execution
    /// timestamp and stores the reference.
    fn set_status(&self, id: &TxId, status: TxStatus, executed_ref: Option<B256>) -> Result<TransactionRecord>;

    /// Idempotent; an absent id is not an error.
    fn remove_record(&self, id: &TxId) -> Result<()>;
}
