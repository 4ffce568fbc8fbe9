//! Threshold readiness, always computed from the live on-chain owner set.

use crate::domain::transaction::TransactionRecord;
use alloy_primitives::Address;

/// Snapshot of how close a record is to its authorization threshold.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReadinessReport {
    pub threshold: usize,
    pub owners: Vec<Address>,
    /// Signers of the record that are currently owners, in signature insertion order.
    pub confirmed: Vec<Address>,
    pub missing: usize,
    pub ready: bool,
}

/// Evaluate a record against owner/threshold data fetched from chain.
///
/// Local signature counts alone are never authoritative: signatures from
/// addresses that are not (or no longer) owners do not count.
pub fn evaluate(record: &TransactionRecord, owners: &[Address], threshold: usize) -> ReadinessReport {
    let confirmed: Vec<Address> =
        record.signatures.iter().map(|entry| entry.signer).filter(|signer| owners.contains(signer)).collect();
    let missing = threshold.saturating_sub(confirmed.len());
    let ready = threshold > 0 && confirmed.len() >= threshold;
    ReadinessReport { threshold, owners: owners.to_vec(), confirmed, missing, ready }
}
