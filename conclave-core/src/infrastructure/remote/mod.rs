//! Remote co-signing service collaborator.
//!
//! The service is the shared rendezvous for signatures; its own storage and
//! authorization are opaque. No strong consistency is assumed: a just-proposed
//! record may not be immediately visible by identifier.

mod http;
mod mock;

pub use http::HttpCosigningService;
pub use mock::MockCosigningService;

use crate::domain::{SignatureEntry, TransactionMetadata};
use crate::foundation::{ConclaveError, TxId};
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One signer's confirmation as the remote service reports it.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct RemoteConfirmation {
    pub owner: Address,
    pub payload: Bytes,
    pub submitted_at_millis: u64,
}

/// A proposal as the remote service reports it.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct RemoteRecord {
    pub tx_id: TxId,
    pub account: Address,
    pub metadata: TransactionMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer: Option<Address>,
    pub confirmations: Vec<RemoteConfirmation>,
}

#[async_trait]
pub trait CosigningService: Send + Sync {
    /// All not-yet-executed proposals the service holds for the account.
    async fn get_pending_for_account(&self, account: Address) -> Result<Vec<RemoteRecord>, ConclaveError>;

    async fn get_by_identifier(&self, id: &TxId) -> Result<Option<RemoteRecord>, ConclaveError>;

    /// Register a new proposal with its founding confirmation.
    async fn propose(
        &self,
        id: &TxId,
        account: Address,
        metadata: &TransactionMetadata,
        founding: &SignatureEntry,
        proposer: Address,
    ) -> Result<(), ConclaveError>;

    /// Submit one additional confirmation for an existing proposal.
    async fn confirm(&self, id: &TxId, confirmation: &SignatureEntry) -> Result<(), ConclaveError>;
}
