//! Secret byte wrapper preventing accidental logging.

use secrecy::{ExposeSecret, SecretVec};

/// Wrapper around secret bytes. Debug output is redacted and the underlying
/// buffer is zeroized on drop.
pub struct SecretBytes {
    inner: SecretVec<u8>,
}

impl Clone for SecretBytes {
    fn clone(&self) -> Self {
        Self::new(self.expose_secret().to_vec())
    }
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: SecretVec::new(bytes) }
    }

    pub fn from_slice(slice: &[u8]) -> Self {
        Self::new(slice.to_vec())
    }

    /// Expose secret bytes for use (explicit, auditable in code review).
    pub fn expose_secret(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED {} bytes])", self.len())
    }
}
