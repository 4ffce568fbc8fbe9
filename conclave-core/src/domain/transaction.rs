use crate::domain::status::TxStatus;
use crate::foundation::{ChainId, TxId};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// How the account performs the inner call.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Call,
    DelegateCall,
}

impl CallKind {
    /// Wire value used in hashing and call encoding.
    pub const fn as_u8(&self) -> u8 {
        match self {
            CallKind::Call => 0,
            CallKind::DelegateCall => 1,
        }
    }
}

/// Immutable transaction payload. Hashed to produce the transaction identifier;
/// never modified after the record is created.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct TransactionMetadata {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub kind: CallKind,
    pub tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    /// Strictly-per-account sequence number.
    pub nonce: u64,
}

impl TransactionMetadata {
    /// A plain value transfer / contract call with default gas parameters.
    pub fn call(to: Address, value: U256, data: Bytes, nonce: u64) -> Self {
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
            nonce,
        }
    }
}

/// One signer's signature over the transaction digest.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct SignatureEntry {
    pub signer: Address,
    pub payload: Bytes,
    pub timestamp_millis: u64,
}

/// Outcome of merging a signature into a record's signature set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergeOutcome {
    /// New signer.
    Added,
    /// Same signer, different payload: later wins.
    Replaced,
    /// Same signer, same payload.
    Unchanged,
}

impl MergeOutcome {
    pub const fn changed(&self) -> bool {
        !matches!(self, MergeOutcome::Unchanged)
    }
}

/// Reference to the confirmed on-chain execution of a record.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct ExecutionReference {
    pub tx_hash: B256,
    pub executed_at_millis: u64,
}

/// Durable record of one multisig transaction, keyed by its content-derived
/// identifier. Created once, mutated in place, never re-keyed.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct TransactionRecord {
    pub tx_id: TxId,
    pub account: Address,
    pub chain_id: ChainId,
    pub metadata: TransactionMetadata,
    pub status: TxStatus,
    /// Insertion-ordered, at most one entry per signer.
    pub signatures: Vec<SignatureEntry>,
    pub creator: Address,
    pub created_at_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionReference>,
}

impl TransactionRecord {
    pub fn new(
        tx_id: TxId,
        account: Address,
        chain_id: ChainId,
        metadata: TransactionMetadata,
        creator: Address,
        created_at_millis: u64,
    ) -> Self {
        Self {
            tx_id,
            account,
            chain_id,
            metadata,
            status: TxStatus::Pending,
            signatures: Vec::new(),
            creator,
            created_at_millis,
            execution: None,
        }
    }

    /// Addresses are compared byte-wise, so the lookup is immune to the
    /// hex-case differences address strings carry at the interface layer.
    pub fn signature_of(&self, signer: Address) -> Option<&SignatureEntry> {
        self.signatures.iter().find(|entry| entry.signer == signer)
    }

    pub fn has_signer(&self, signer: Address) -> bool {
        self.signature_of(signer).is_some()
    }

    pub fn signer_count(&self) -> usize {
        self.signatures.len()
    }

    /// Merge one signature under the replace rule: at most one entry per
    /// signer, a later signature from the same signer replaces in place
    /// (insertion order of the set is preserved).
    pub fn merge_signature(&mut self, entry: SignatureEntry) -> MergeOutcome {
        match self.signatures.iter_mut().find(|existing| existing.signer == entry.signer) {
            Some(existing) => {
                if existing.payload == entry.payload {
                    MergeOutcome::Unchanged
                } else {
                    existing.payload = entry.payload;
                    existing.timestamp_millis = entry.timestamp_millis;
                    MergeOutcome::Replaced
                }
            }
            None => {
                self.signatures.push(entry);
                MergeOutcome::Added
            }
        }
    }
}
