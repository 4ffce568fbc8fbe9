//! Application layer: the operations the command surface invokes.

pub mod execution;
pub mod proposal;
pub mod signing;
pub mod sync;

pub use execution::{execute_transaction, reject_transaction, ExecuteOutcome};
pub use proposal::{create_transaction, TransactionDraft};
pub use signing::{sign_transaction, NextAction, SignOutcome};
pub use sync::{PullOutcome, PullReport, PushOutcome, PushReport, SyncEngine, SyncFailure, SyncReport};
