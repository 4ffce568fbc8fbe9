//! Chain RPC collaborator: owner set, threshold, account nonce, execution.
//!
//! The chain is an opaque authority here. Callers never cache owner or
//! threshold data across operations; readiness is recomputed live.

pub mod abi;
mod http;
mod mock;

pub use http::HttpChainRpc;
pub use mock::MockChainRpc;

use crate::foundation::ConclaveError;
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;

/// One on-chain execution request: the encoded account call plus the sender
/// paying for it.
#[derive(Clone, Debug)]
pub struct ExecutionCall {
    pub account: Address,
    pub sender: Address,
    pub data: Bytes,
}

#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn fetch_owners(&self, account: Address) -> Result<Vec<Address>, ConclaveError>;

    async fn fetch_threshold(&self, account: Address) -> Result<usize, ConclaveError>;

    async fn fetch_nonce(&self, account: Address) -> Result<u64, ConclaveError>;

    /// Broadcast and block until the transaction is confirmed or failed.
    /// Timeouts surface as `NetworkError`; the core never retries.
    async fn broadcast_and_confirm(&self, call: ExecutionCall) -> Result<B256, ConclaveError>;
}
