//! Execution: readiness-gated broadcast of a fully confirmed transaction.

use crate::domain::readiness::evaluate;
use crate::domain::status::is_terminal;
use crate::domain::{TransactionRecord, TxStatus};
use crate::foundation::{ConclaveError, TxId};
use crate::infrastructure::rpc::{abi, ChainRpc, ExecutionCall};
use crate::infrastructure::storage::TransactionStore;
use alloy_primitives::{Address, B256};

#[derive(Debug)]
pub struct ExecuteOutcome {
    pub record: TransactionRecord,
    pub tx_hash: B256,
}

/// Execute `tx_id` from `sender`, provided the live owner/threshold check
/// passes. Owner signatures are sorted ascending by signer address and
/// concatenated, the order the account contract verifies them in.
pub async fn execute_transaction(
    store: &dyn TransactionStore,
    chain: &dyn ChainRpc,
    tx_id: &TxId,
    sender: Address,
) -> Result<ExecuteOutcome, ConclaveError> {
    let record = store.get_record(tx_id)?.ok_or_else(|| ConclaveError::record_not_found(tx_id))?;
    if is_terminal(record.status) {
        return Err(ConclaveError::terminal_record(tx_id, record.status));
    }

    let owners = chain.fetch_owners(record.account).await?;
    let threshold = chain.fetch_threshold(record.account).await?;
    let readiness = evaluate(&record, &owners, threshold);
    if !readiness.ready {
        return Err(ConclaveError::ThresholdNotMet { required: readiness.threshold, collected: readiness.confirmed.len() });
    }

    let mut owner_signatures: Vec<_> =
        record.signatures.iter().filter(|entry| owners.contains(&entry.signer)).collect();
    owner_signatures.sort_by_key(|entry| entry.signer);
    let mut blob = Vec::with_capacity(owner_signatures.len() * 65);
    for entry in owner_signatures {
        blob.extend_from_slice(&entry.payload);
    }

    let data = abi::encode_exec_transaction(&record.metadata, &blob);
    let tx_hash = chain.broadcast_and_confirm(ExecutionCall { account: record.account, sender, data }).await?;
    let record = store.set_status(tx_id, TxStatus::Executed, Some(tx_hash))?;
    log::info!("executed {} as {}", tx_id, tx_hash);
    Ok(ExecuteOutcome { record, tx_hash })
}

/// Mark a Pending/Signed record Rejected. Terminal thereafter.
pub fn reject_transaction(store: &dyn TransactionStore, tx_id: &TxId) -> Result<TransactionRecord, ConclaveError> {
    let record = store.set_status(tx_id, TxStatus::Rejected, None)?;
    log::info!("rejected {}", tx_id);
    Ok(record)
}
