//! Encrypted key vault gating who may produce signatures.

mod crypto;
mod passphrase;
mod secret;
mod vault;

pub use crypto::{EncryptedSecret, KdfParams};
pub use passphrase::prompt_hidden_input;
pub use secret::SecretBytes;
pub use vault::Vault;
