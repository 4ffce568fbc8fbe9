//! Synchronization engine: reconcile the local store with the remote
//! co-signing service.
//!
//! The engine moves metadata and signatures only. It never signs, never
//! executes, and never changes a record's status. Per-signer merge is
//! commutative and idempotent: a second run with no external change produces
//! zero new signatures. One record's failure never aborts the rest of a
//! batch; failures are collected into the report.

use crate::domain::hashes::compute_tx_id;
use crate::domain::status::is_terminal;
use crate::domain::{SignatureEntry, TransactionRecord, TxStatus};
use crate::foundation::{ChainId, ConclaveError, TxId};
use crate::infrastructure::remote::{CosigningService, RemoteConfirmation, RemoteRecord};
use crate::infrastructure::storage::{RecordFilter, TransactionStore};
use alloy_primitives::Address;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PullOutcome {
    /// No local record existed; one was created and confirmations imported.
    Imported { signatures: usize },
    /// Local record gained signatures from signers it did not know.
    Updated { new_signatures: usize },
    /// Nothing to do.
    Skipped,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PushOutcome {
    /// The remote had no such record; it was proposed with our signature.
    Proposed { confirmations_sent: usize },
    /// The remote record gained confirmations it was missing.
    Updated { confirmations_sent: usize },
    /// Remote already held every local signature.
    InSync,
}

#[derive(Clone, Debug)]
pub struct SyncFailure {
    pub tx_id: TxId,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct PullReport {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub new_signatures: usize,
    pub failures: Vec<SyncFailure>,
}

#[derive(Debug, Default)]
pub struct PushReport {
    pub proposed: usize,
    pub updated: usize,
    pub in_sync: usize,
    /// Records eligible for push but lacking the active identity's signature.
    pub skipped_unsigned: usize,
    pub confirmations_sent: usize,
    pub failures: Vec<SyncFailure>,
}

#[derive(Debug)]
pub struct SyncReport {
    pub pull: PullReport,
    pub push: PushReport,
}

/// One engine per (chain, account) pair. `active_signer` determines which
/// signatures count as "ours" when pushing.
pub struct SyncEngine<'a> {
    store: &'a dyn TransactionStore,
    remote: &'a dyn CosigningService,
    account: Address,
    chain_id: ChainId,
    active_signer: Address,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        store: &'a dyn TransactionStore,
        remote: &'a dyn CosigningService,
        account: Address,
        chain_id: ChainId,
        active_signer: Address,
    ) -> Self {
        Self { store, remote, account, chain_id, active_signer }
    }

    /// Reconcile one remote record into the store.
    ///
    /// A locally unknown record is created Pending and every remote
    /// confirmation imported oldest-first, so later-wins resolves to the true
    /// latest. For a known record only confirmations from locally unknown
    /// signers are added: a trusted local signature is never overwritten by a
    /// payload of unknown provenance.
    pub fn pull_one(&self, remote_record: &RemoteRecord) -> Result<PullOutcome, ConclaveError> {
        let tx_id = remote_record.tx_id;
        let computed = compute_tx_id(self.chain_id, self.account, &remote_record.metadata);
        if computed != tx_id {
            return Err(ConclaveError::ParseError(format!(
                "remote record {tx_id} does not hash to its identifier (computed {computed})"
            )));
        }

        match self.store.get_record(&tx_id)? {
            None => {
                let creator = remote_record
                    .proposer
                    .or_else(|| oldest_confirmation(remote_record).map(|confirmation| confirmation.owner))
                    .unwrap_or(Address::ZERO);
                self.store.create_record(tx_id, self.account, self.chain_id, remote_record.metadata.clone(), creator)?;

                let mut confirmations = remote_record.confirmations.clone();
                confirmations.sort_by_key(|confirmation| confirmation.submitted_at_millis);
                let mut signers = HashSet::new();
                for confirmation in confirmations {
                    signers.insert(confirmation.owner);
                    self.store.add_signature(&tx_id, signature_from_confirmation(confirmation))?;
                }
                log::debug!("imported {} with {} remote signers", tx_id, signers.len());
                Ok(PullOutcome::Imported { signatures: signers.len() })
            }
            Some(local) => {
                if is_terminal(local.status) {
                    log::debug!("skipping pull into terminal record {} ({})", tx_id, local.status);
                    return Ok(PullOutcome::Skipped);
                }

                let mut confirmations = remote_record.confirmations.clone();
                confirmations.sort_by_key(|confirmation| confirmation.submitted_at_millis);
                let mut new_signers = HashSet::new();
                for confirmation in confirmations {
                    match local.signature_of(confirmation.owner) {
                        Some(existing) => {
                            if existing.payload != confirmation.payload {
                                log::warn!(
                                    "remote confirmation for {} by {} differs from the local signature; keeping local",
                                    tx_id,
                                    confirmation.owner
                                );
                            }
                        }
                        None => {
                            new_signers.insert(confirmation.owner);
                            self.store.add_signature(&tx_id, signature_from_confirmation(confirmation))?;
                        }
                    }
                }
                if new_signers.is_empty() {
                    Ok(PullOutcome::Skipped)
                } else {
                    Ok(PullOutcome::Updated { new_signatures: new_signers.len() })
                }
            }
        }
    }

    /// Publish one local record to the remote service.
    ///
    /// Requires the active identity's own signature on the record; proposing
    /// a transaction we have not signed would put our name on someone else's
    /// payload.
    pub async fn push_one(&self, record: &TransactionRecord) -> Result<PushOutcome, ConclaveError> {
        let tx_id = record.tx_id;
        let ours = record.signature_of(self.active_signer).cloned().ok_or_else(|| ConclaveError::NotSignedLocally {
            id: tx_id.to_string(),
            signer: self.active_signer.to_checksum(None),
        })?;

        match self.remote.get_by_identifier(&tx_id).await? {
            None => {
                self.remote.propose(&tx_id, record.account, &record.metadata, &ours, self.active_signer).await?;
                let mut sent = 0;
                for entry in &record.signatures {
                    if entry.signer != self.active_signer {
                        self.remote.confirm(&tx_id, entry).await?;
                        sent += 1;
                    }
                }
                log::debug!("proposed {} with {} extra confirmations", tx_id, sent);
                Ok(PushOutcome::Proposed { confirmations_sent: sent })
            }
            Some(remote_record) => {
                let mut sent = 0;
                for entry in &record.signatures {
                    let known = remote_record.confirmations.iter().any(|confirmation| confirmation.owner == entry.signer);
                    if !known {
                        self.remote.confirm(&tx_id, entry).await?;
                        sent += 1;
                    }
                }
                if sent == 0 {
                    Ok(PushOutcome::InSync)
                } else {
                    Ok(PushOutcome::Updated { confirmations_sent: sent })
                }
            }
        }
    }

    /// Pull every pending remote record for the account. Per-record failures
    /// land in the report; only the initial listing aborts the batch.
    pub async fn pull(&self) -> Result<PullReport, ConclaveError> {
        let remote_records = self.remote.get_pending_for_account(self.account).await?;
        let mut report = PullReport::default();
        for remote_record in &remote_records {
            match self.pull_one(remote_record) {
                Ok(PullOutcome::Imported { signatures }) => {
                    report.imported += 1;
                    report.new_signatures += signatures;
                }
                Ok(PullOutcome::Updated { new_signatures }) => {
                    report.updated += 1;
                    report.new_signatures += new_signatures;
                }
                Ok(PullOutcome::Skipped) => report.skipped += 1,
                Err(err) => {
                    log::warn!("pull failed for {}: {}", remote_record.tx_id, err);
                    report.failures.push(SyncFailure { tx_id: remote_record.tx_id, error: err.to_string() });
                }
            }
        }
        log::info!(
            "pull for {}: {} imported, {} updated, {} skipped, {} failed",
            self.account,
            report.imported,
            report.updated,
            report.skipped,
            report.failures.len()
        );
        Ok(report)
    }

    /// Push every local Pending/Signed record carrying at least one
    /// signature. Records without the active identity's signature are counted
    /// separately, not treated as failures.
    pub async fn push(&self) -> Result<PushReport, ConclaveError> {
        let records = self.store.list_records(RecordFilter::default())?;
        let mut report = PushReport::default();
        for record in &records {
            if record.account != self.account || record.chain_id != self.chain_id {
                continue;
            }
            if !matches!(record.status, TxStatus::Pending | TxStatus::Signed) || record.signatures.is_empty() {
                continue;
            }
            if !record.has_signer(self.active_signer) {
                report.skipped_unsigned += 1;
                continue;
            }
            match self.push_one(record).await {
                Ok(PushOutcome::Proposed { confirmations_sent }) => {
                    report.proposed += 1;
                    report.confirmations_sent += confirmations_sent;
                }
                Ok(PushOutcome::Updated { confirmations_sent }) => {
                    report.updated += 1;
                    report.confirmations_sent += confirmations_sent;
                }
                Ok(PushOutcome::InSync) => report.in_sync += 1,
                Err(err) => {
                    log::warn!("push failed for {}: {}", record.tx_id, err);
                    report.failures.push(SyncFailure { tx_id: record.tx_id, error: err.to_string() });
                }
            }
        }
        log::info!(
            "push for {}: {} proposed, {} updated, {} in sync, {} unsigned, {} failed",
            self.account,
            report.proposed,
            report.updated,
            report.in_sync,
            report.skipped_unsigned,
            report.failures.len()
        );
        Ok(report)
    }

    /// Pull, then push, strictly in that order: a record the pull just
    /// imported is push-eligible within the same run.
    pub async fn sync(&self) -> Result<SyncReport, ConclaveError> {
        let pull = self.pull().await?;
        let push = self.push().await?;
        Ok(SyncReport { pull, push })
    }
}

fn oldest_confirmation(record: &RemoteRecord) -> Option<&RemoteConfirmation> {
    record.confirmations.iter().min_by_key(|confirmation| confirmation.submitted_at_millis)
}

fn signature_from_confirmation(confirmation: RemoteConfirmation) -> SignatureEntry {
    SignatureEntry {
        signer: confirmation.owner,
        payload: confirmation.payload,
        timestamp_millis: confirmation.submitted_at_millis,
    }
}
