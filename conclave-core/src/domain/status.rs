use crate::foundation::ConclaveError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a transaction record.
///
/// Pending is the only initial state; Executed and Rejected are terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Signed,
    Executed,
    Rejected,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Signed => write!(f, "signed"),
            TxStatus::Executed => write!(f, "executed"),
            TxStatus::Rejected => write!(f, "rejected"),
        }
    }
}

const VALID_TRANSITIONS: &[(TxStatus, TxStatus)] = &[
    (TxStatus::Pending, TxStatus::Signed),
    (TxStatus::Pending, TxStatus::Executed),
    (TxStatus::Pending, TxStatus::Rejected),
    (TxStatus::Signed, TxStatus::Executed),
    (TxStatus::Signed, TxStatus::Rejected),
];

pub fn is_terminal(status: TxStatus) -> bool {
    matches!(status, TxStatus::Executed | TxStatus::Rejected)
}

pub fn is_valid_transition(from: TxStatus, to: TxStatus) -> bool {
    if is_terminal(from) {
        return false;
    }
    if from == to {
        // Re-asserting a non-terminal status is a no-op.
        return true;
    }
    VALID_TRANSITIONS.contains(&(from, to))
}

pub fn ensure_valid_transition(from: TxStatus, to: TxStatus) -> Result<(), ConclaveError> {
    if is_valid_transition(from, to) {
        Ok(())
    } else {
        Err(ConclaveError::InvalidStatusTransition { from: from.to_string(), to: to.to_string() })
    }
}
