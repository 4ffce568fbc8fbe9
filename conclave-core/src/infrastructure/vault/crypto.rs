//! Per-identity encrypted secret blobs (Argon2id + XChaCha20-Poly1305).

use crate::foundation::ConclaveError;
use crate::infrastructure::vault::secret::SecretBytes;
use argon2::{Argon2, ParamsBuilder, Version};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::XChaCha20Poly1305;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

const TAG_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self { m_cost: 65536, t_cost: 3, p_cost: 4 }
    }
}

/// Encrypted secret at rest. Exists only for local-secret identities and is
/// destroyed together with its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    #[serde(with = "hex::serde")]
    pub salt: [u8; 32],
    #[serde(with = "hex::serde")]
    pub nonce: [u8; 24],
    #[serde(with = "hex::serde")]
    pub tag: [u8; TAG_LEN],
    #[serde(with = "hex::serde")]
    pub ciphertext: Vec<u8>,
    pub kdf: KdfParams,
}

impl EncryptedSecret {
    /// Encrypt `secret` under a key derived from `password` with a fresh
    /// random salt and nonce.
    pub fn encrypt(secret: &[u8], password: &str, kdf: KdfParams) -> Result<Self, ConclaveError> {
        let mut salt = [0u8; 32];
        let mut nonce = [0u8; 24];
        let mut rng = OsRng;
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut nonce);

        let mut key = derive_key(password, &salt, &kdf)?;
        let cipher = XChaCha20Poly1305::new(&key.into());
        let mut sealed = cipher
            .encrypt(&nonce.into(), Payload { msg: secret, aad: &[] })
            .map_err(|e| ConclaveError::crypto_error("secret encryption", e.to_string()))?;
        key.zeroize();

        if sealed.len() < TAG_LEN {
            return Err(ConclaveError::crypto_error("secret encryption", "sealed payload shorter than tag"));
        }
        let tag_start = sealed.len() - TAG_LEN;
        let tag: [u8; TAG_LEN] = sealed[tag_start..]
            .try_into()
            .map_err(|_| ConclaveError::crypto_error("secret encryption", "tag split failed"))?;
        sealed.truncate(tag_start);

        Ok(Self { salt, nonce, tag, ciphertext: sealed, kdf })
    }

    /// Decrypt with the password-derived key and verify the authentication
    /// tag. Any failure surfaces as `WrongPassword`: a corrupt blob is
    /// indistinguishable from a wrong password on purpose, so the error is
    /// not an oracle.
    pub fn decrypt(&self, password: &str) -> Result<SecretBytes, ConclaveError> {
        let mut key = derive_key(password, &self.salt, &self.kdf)?;
        let cipher = XChaCha20Poly1305::new(&key.into());
        let mut sealed = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&self.ciphertext);
        sealed.extend_from_slice(&self.tag);
        let result = cipher.decrypt(&self.nonce.into(), Payload { msg: sealed.as_ref(), aad: &[] });
        key.zeroize();
        let mut plaintext = result.map_err(|_| ConclaveError::WrongPassword)?;
        let secret = SecretBytes::from_slice(&plaintext);
        plaintext.zeroize();
        Ok(secret)
    }
}

fn derive_key(password: &str, salt: &[u8; 32], params: &KdfParams) -> Result<[u8; 32], ConclaveError> {
    let mut key = [0u8; 32];
    let argon2_params = ParamsBuilder::new()
        .m_cost(params.m_cost)
        .t_cost(params.t_cost)
        .p_cost(params.p_cost)
        .build()
        .map_err(|e| ConclaveError::crypto_error("argon2 params", e.to_string()))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| ConclaveError::crypto_error("argon2 key derivation", e.to_string()))?;
    Ok(key)
}
