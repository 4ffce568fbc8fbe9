//! Signing action: produce one signature, merge it, report readiness.
//!
//! This is a linear pipeline: the outcome describes what is possible next;
//! whether to chain into execute or push is the caller's decision.

use crate::domain::hashes::{domain_separator, struct_hash, transaction_digest};
use crate::domain::readiness::{evaluate, ReadinessReport};
use crate::domain::status::is_terminal;
use crate::domain::{IdentityKind, MergeOutcome, SignatureEntry, TransactionRecord, TxStatus, WalletIdentity};
use crate::foundation::{now_millis, ConclaveError, TxId};
use crate::infrastructure::hardware::HardwareSigner;
use crate::infrastructure::rpc::ChainRpc;
use crate::infrastructure::storage::TransactionStore;
use crate::infrastructure::vault::Vault;
use alloy_primitives::{Bytes, B256};
use secp256k1::{Message, Secp256k1, SecretKey};

/// What the caller may sensibly do after this signature landed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NextAction {
    /// Threshold reached: the transaction can be executed.
    Execute,
    /// Share the signature set with the co-signing service.
    Push,
}

#[derive(Debug)]
pub struct SignOutcome {
    pub record: TransactionRecord,
    pub merge: MergeOutcome,
    pub readiness: ReadinessReport,
    pub next_actions: Vec<NextAction>,
}

/// Sign `tx_id` with `identity`.
///
/// `password` is required for local-secret identities; `hardware` is required
/// for external-signer identities. The credential kind is dispatched exactly
/// once, here.
pub async fn sign_transaction(
    store: &dyn TransactionStore,
    vault: &Vault,
    hardware: Option<&dyn HardwareSigner>,
    chain: &dyn ChainRpc,
    identity: &WalletIdentity,
    password: Option<&str>,
    tx_id: &TxId,
) -> Result<SignOutcome, ConclaveError> {
    let record = store.get_record(tx_id)?.ok_or_else(|| ConclaveError::record_not_found(tx_id))?;
    if is_terminal(record.status) {
        return Err(ConclaveError::terminal_record(tx_id, record.status));
    }

    let owners = chain.fetch_owners(record.account).await?;
    if !owners.contains(&identity.address) {
        return Err(ConclaveError::NotAnOwner {
            signer: identity.address.to_checksum(None),
            account: record.account.to_checksum(None),
        });
    }

    let separator = domain_separator(record.chain_id, record.account);
    let digest = struct_hash(&record.metadata);
    let payload = match identity.kind {
        IdentityKind::LocalSecret => {
            let password = password
                .ok_or_else(|| ConclaveError::ParseError("password required for a local-secret identity".to_string()))?;
            sign_with_local_secret(vault, identity, password, transaction_digest(separator, digest))?
        }
        IdentityKind::ExternalSigner => {
            let signer = hardware.ok_or_else(|| ConclaveError::NoHardwareSigner { id: identity.id.to_string() })?;
            let path = identity.derivation_path.as_deref().unwrap_or_default();
            signer.sign_digest(path, digest, separator).await?
        }
    };

    let entry = SignatureEntry { signer: identity.address, payload, timestamp_millis: now_millis() };
    let merge = store.add_signature(tx_id, entry)?;
    if record.status == TxStatus::Pending {
        store.set_status(tx_id, TxStatus::Signed, None)?;
    }
    vault.touch_last_used(&identity.id)?;

    let record = store.get_record(tx_id)?.ok_or_else(|| ConclaveError::record_not_found(tx_id))?;
    let threshold = chain.fetch_threshold(record.account).await?;
    let readiness = evaluate(&record, &owners, threshold);
    let next_actions = if readiness.ready { vec![NextAction::Execute, NextAction::Push] } else { vec![NextAction::Push] };

    log::info!(
        "signed {} with {} ({} of {} confirmations)",
        tx_id,
        identity.id,
        readiness.confirmed.len(),
        readiness.threshold
    );
    Ok(SignOutcome { record, merge, readiness, next_actions })
}

fn sign_with_local_secret(
    vault: &Vault,
    identity: &WalletIdentity,
    password: &str,
    digest: B256,
) -> Result<Bytes, ConclaveError> {
    let secret = vault.reveal_secret(&identity.id, password)?;
    let secret_key = SecretKey::from_slice(secret.expose_secret())?;
    let secp = Secp256k1::new();
    let message = Message::from_digest(digest.0);
    let (recovery_id, compact) = secp.sign_ecdsa_recoverable(&message, &secret_key).serialize_compact();

    let mut payload = Vec::with_capacity(65);
    payload.extend_from_slice(&compact);
    payload.push(27 + recovery_id.to_i32() as u8);
    Ok(Bytes::from(payload))
}
