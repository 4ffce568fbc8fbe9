//! Proposal creation: draft → metadata → content-derived id → Pending record.

use crate::domain::hashes::compute_tx_id;
use crate::domain::{CallKind, TransactionMetadata, TransactionRecord};
use crate::foundation::{ChainId, ConclaveError};
use crate::infrastructure::rpc::ChainRpc;
use crate::infrastructure::storage::TransactionStore;
use alloy_primitives::{Address, Bytes, U256};

/// User-supplied transaction draft. The nonce is taken from the draft when
/// pinned, otherwise fetched live from the account.
#[derive(Clone, Debug)]
pub struct TransactionDraft {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub kind: CallKind,
    pub tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: Option<u64>,
}

impl TransactionDraft {
    pub fn call(to: Address, value: U256, data: Bytes) -> Self {
        Self {
            to,
            value,
            data,
            kind: CallKind::Call,
            tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce: None,
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_kind(mut self, kind: CallKind) -> Self {
        self.kind = kind;
        self
    }
}

pub async fn create_transaction(
    store: &dyn TransactionStore,
    chain: &dyn ChainRpc,
    account: Address,
    chain_id: ChainId,
    draft: TransactionDraft,
    creator: Address,
) -> Result<TransactionRecord, ConclaveError> {
    let nonce = match draft.nonce {
        Some(nonce) => nonce,
        None => chain.fetch_nonce(account).await?,
    };
    let metadata = TransactionMetadata {
        to: draft.to,
        value: draft.value,
        data: draft.data,
        kind: draft.kind,
        tx_gas: draft.tx_gas,
        base_gas: draft.base_gas,
        gas_price: draft.gas_price,
        gas_token: draft.gas_token,
        refund_receiver: draft.refund_receiver,
        nonce,
    };
    let tx_id = compute_tx_id(chain_id, account, &metadata);
    let record = store.create_record(tx_id, account, chain_id, metadata, creator)?;
    log::info!("created transaction {} for account {} (nonce {})", record.tx_id, account, nonce);
    Ok(record)
}
