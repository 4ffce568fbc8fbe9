use crate::foundation::ConclaveError;
use crate::infrastructure::rpc::{ChainRpc, ExecutionCall};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory chain double for tests: fixed owners/threshold/nonce, recorded
/// broadcasts.
pub struct MockChainRpc {
    owners: Vec<Address>,
    threshold: usize,
    nonce: u64,
    tx_hash: B256,
    broadcasts: Mutex<Vec<ExecutionCall>>,
}

impl MockChainRpc {
    pub fn new(owners: Vec<Address>, threshold: usize, nonce: u64) -> Self {
        Self { owners, threshold, nonce, tx_hash: B256::repeat_byte(0xEE), broadcasts: Mutex::new(Vec::new()) }
    }

    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn last_broadcast(&self) -> Option<ExecutionCall> {
        self.broadcasts.lock().ok().and_then(|b| b.last().cloned())
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn fetch_owners(&self, _account: Address) -> Result<Vec<Address>, ConclaveError> {
        Ok(self.owners.clone())
    }

    async fn fetch_threshold(&self, _account: Address) -> Result<usize, ConclaveError> {
        Ok(self.threshold)
    }

    async fn fetch_nonce(&self, _account: Address) -> Result<u64, ConclaveError> {
        Ok(self.nonce)
    }

    async fn broadcast_and_confirm(&self, call: ExecutionCall) -> Result<B256, ConclaveError> {
        self.broadcasts
            .lock()
            .map_err(|_| ConclaveError::storage_error("mock broadcast lock", "poisoned"))?
            .push(call);
        Ok(self.tx_hash)
    }
}
