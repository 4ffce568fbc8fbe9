//! Hardware signer collaborator.

use crate::foundation::ConclaveError;
use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;

/// A signer whose secret never leaves the device. Connection lifecycle is
/// owned by the implementation.
#[async_trait]
pub trait HardwareSigner: Send + Sync {
    async fn sign_digest(
        &self,
        derivation_path: &str,
        struct_hash: B256,
        domain_separator: B256,
    ) -> Result<Bytes, ConclaveError>;
}
