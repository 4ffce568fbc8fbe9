//! Domain layer: transaction records, identities, status machine, hashing,
//! readiness. No I/O here.

pub mod hashes;
pub mod identity;
pub mod readiness;
pub mod status;
pub mod transaction;

pub use identity::{IdentityKind, WalletIdentity};
pub use readiness::ReadinessReport;
pub use status::TxStatus;
pub use transaction::{CallKind, ExecutionReference, MergeOutcome, SignatureEntry, TransactionMetadata, TransactionRecord};
