use crate::foundation::IdentityId;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the identity's signing credential lives.
///
/// Closed variant set: callers dispatch on it exactly once at the signing
/// call site.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityKind {
    /// The vault holds the secret, encrypted at rest.
    LocalSecret,
    /// A hardware signer holds the secret; only routing metadata is stored.
    ExternalSigner,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKind::LocalSecret => write!(f, "local-secret"),
            IdentityKind::ExternalSigner => write!(f, "external-signer"),
        }
    }
}

/// One wallet identity. Immutable except `name` and `last_used_millis`.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct WalletIdentity {
    pub id: IdentityId,
    pub name: String,
    pub address: Address,
    pub kind: IdentityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation_path: Option<String>,
    pub created_at_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_millis: Option<u64>,
}
