//! Key vault: wallet identity bookkeeping plus encrypted secrets at rest.

use crate::domain::hashes::address_from_public_key;
use crate::domain::{IdentityKind, WalletIdentity};
use crate::foundation::{now_millis, ConclaveError, IdentityId, SECRETS_FILE_NAME, WALLETS_FILE_NAME};
use crate::infrastructure::vault::crypto::{EncryptedSecret, KdfParams};
use crate::infrastructure::vault::secret::SecretBytes;
use alloy_primitives::Address;
use secp256k1::{Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize)]
struct WalletFile {
    identities: Vec<WalletIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active: Option<IdentityId>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SecretsFile {
    secrets: BTreeMap<IdentityId, EncryptedSecret>,
}

/// One vault per data directory. All mutation is read-modify-write over the
/// persisted files; decrypted secrets never touch disk.
pub struct Vault {
    dir: PathBuf,
    kdf: KdfParams,
}

impl Vault {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), kdf: KdfParams::default() }
    }

    /// Override KDF cost parameters (tests use cheap ones).
    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    fn wallets_path(&self) -> PathBuf {
        self.dir.join(WALLETS_FILE_NAME)
    }

    fn secrets_path(&self) -> PathBuf {
        self.dir.join(SECRETS_FILE_NAME)
    }

    /// Import a locally-held signing secret. The address is derived from the
    /// secret, so the same key always lands on the same identity. The
    /// first-ever identity becomes active automatically.
    pub fn import_local_secret(&self, name: &str, secret: &[u8], password: &str) -> Result<WalletIdentity, ConclaveError> {
        let secret_key = SecretKey::from_slice(secret)?;
        let address = address_from_public_key(&secret_key.public_key(&Secp256k1::new()));

        let mut wallets = self.load_wallets()?;
        ensure_address_free(&wallets, address)?;

        let encrypted = EncryptedSecret::encrypt(secret, password, self.kdf.clone())?;
        let identity = WalletIdentity {
            id: identity_id_for(address),
            name: name.to_string(),
            address,
            kind: IdentityKind::LocalSecret,
            derivation_path: None,
            created_at_millis: now_millis(),
            last_used_millis: None,
        };

        let mut secrets = self.load_secrets()?;
        secrets.secrets.insert(identity.id.clone(), encrypted);
        self.persist_secrets(&secrets)?;

        if wallets.identities.is_empty() {
            wallets.active = Some(identity.id.clone());
        }
        wallets.identities.push(identity.clone());
        self.persist_wallets(&wallets)?;
        log::info!("imported local-secret identity {} ({})", identity.id, identity.name);
        Ok(identity)
    }

    /// Import metadata for an identity whose secret lives in a hardware
    /// signer. No secret is stored.
    pub fn import_external_identity(
        &self,
        name: &str,
        address: Address,
        derivation_path: Option<String>,
    ) -> Result<WalletIdentity, ConclaveError> {
        let mut wallets = self.load_wallets()?;
        ensure_address_free(&wallets, address)?;

        let identity = WalletIdentity {
            id: identity_id_for(address),
            name: name.to_string(),
            address,
            kind: IdentityKind::ExternalSigner,
            derivation_path,
            created_at_millis: now_millis(),
            last_used_millis: None,
        };
        if wallets.identities.is_empty() {
            wallets.active = Some(identity.id.clone());
        }
        wallets.identities.push(identity.clone());
        self.persist_wallets(&wallets)?;
        log::info!("imported external-signer identity {} ({})", identity.id, identity.name);
        Ok(identity)
    }

    /// Decrypt a local secret for the duration of a signing call.
    ///
    /// A wrong password and a corrupt blob are deliberately indistinguishable.
    pub fn reveal_secret(&self, id: &IdentityId, password: &str) -> Result<SecretBytes, ConclaveError> {
        let identity = self.get(id)?;
        if identity.kind != IdentityKind::LocalSecret {
            return Err(ConclaveError::UnsupportedIdentityKind { id: id.to_string(), kind: identity.kind.to_string() });
        }
        let secrets = self.load_secrets()?;
        let blob = secrets.secrets.get(id).ok_or_else(|| ConclaveError::SecretNotFound(id.to_string()))?;
        blob.decrypt(password)
    }

    pub fn get(&self, id: &IdentityId) -> Result<WalletIdentity, ConclaveError> {
        self.load_wallets()?
            .identities
            .into_iter()
            .find(|identity| &identity.id == id)
            .ok_or_else(|| ConclaveError::IdentityNotFound(id.to_string()))
    }

    pub fn find_by_address(&self, address: Address) -> Result<Option<WalletIdentity>, ConclaveError> {
        Ok(self.load_wallets()?.identities.into_iter().find(|identity| identity.address == address))
    }

    pub fn list(&self) -> Result<Vec<WalletIdentity>, ConclaveError> {
        Ok(self.load_wallets()?.identities)
    }

    pub fn active(&self) -> Result<Option<WalletIdentity>, ConclaveError> {
        let wallets = self.load_wallets()?;
        let Some(active_id) = wallets.active else {
            return Ok(None);
        };
        Ok(wallets.identities.into_iter().find(|identity| identity.id == active_id))
    }

    pub fn set_active(&self, id: &IdentityId) -> Result<(), ConclaveError> {
        let mut wallets = self.load_wallets()?;
        if !wallets.identities.iter().any(|identity| &identity.id == id) {
            return Err(ConclaveError::IdentityNotFound(id.to_string()));
        }
        wallets.active = Some(id.clone());
        self.persist_wallets(&wallets)
    }

    /// Remove an identity and destroy its encrypted secret. Removing the
    /// active identity reassigns "active" to the oldest remaining identity.
    pub fn remove(&self, id: &IdentityId) -> Result<(), ConclaveError> {
        let mut wallets = self.load_wallets()?;
        let before = wallets.identities.len();
        wallets.identities.retain(|identity| &identity.id != id);
        if wallets.identities.len() == before {
            return Err(ConclaveError::IdentityNotFound(id.to_string()));
        }

        if wallets.active.as_ref() == Some(id) {
            wallets.active = wallets
                .identities
                .iter()
                .min_by_key(|identity| (identity.created_at_millis, identity.id.clone()))
                .map(|identity| identity.id.clone());
        }

        let mut secrets = self.load_secrets()?;
        if secrets.secrets.remove(id).is_some() {
            self.persist_secrets(&secrets)?;
        }
        self.persist_wallets(&wallets)?;
        log::info!("removed identity {}", id);
        Ok(())
    }

    pub fn rename(&self, id: &IdentityId, name: &str) -> Result<(), ConclaveError> {
        self.update_identity(id, |identity| identity.name = name.to_string())
    }

    pub fn touch_last_used(&self, id: &IdentityId) -> Result<(), ConclaveError> {
        self.update_identity(id, |identity| identity.last_used_millis = Some(now_millis()))
    }

    fn update_identity(&self, id: &IdentityId, apply: impl FnOnce(&mut WalletIdentity)) -> Result<(), ConclaveError> {
        let mut wallets = self.load_wallets()?;
        let identity = wallets
            .identities
            .iter_mut()
            .find(|identity| &identity.id == id)
            .ok_or_else(|| ConclaveError::IdentityNotFound(id.to_string()))?;
        apply(identity);
        self.persist_wallets(&wallets)
    }

    fn load_wallets(&self) -> Result<WalletFile, ConclaveError> {
        load_json(&self.wallets_path())
    }

    fn persist_wallets(&self, wallets: &WalletFile) -> Result<(), ConclaveError> {
        write_json_atomic(&self.wallets_path(), wallets, false)
    }

    fn load_secrets(&self) -> Result<SecretsFile, ConclaveError> {
        let path = self.secrets_path();
        #[cfg(target_family = "unix")]
        if path.exists() {
            validate_file_permissions(&path)?;
        }
        load_json(&path)
    }

    fn persist_secrets(&self, secrets: &SecretsFile) -> Result<(), ConclaveError> {
        write_json_atomic(&self.secrets_path(), secrets, true)
    }
}

fn identity_id_for(address: Address) -> IdentityId {
    IdentityId::new(address.to_checksum(None).to_lowercase())
}

fn ensure_address_free(wallets: &WalletFile, address: Address) -> Result<(), ConclaveError> {
    if wallets.identities.iter().any(|identity| identity.address == address) {
        return Err(ConclaveError::DuplicateIdentity { address: address.to_checksum(None) });
    }
    Ok(())
}

fn load_json<T: Default + serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConclaveError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let data = std::fs::read(path).map_err(|e| ConclaveError::storage_error("read vault file", e.to_string()))?;
    Ok(serde_json::from_slice(&data)?)
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T, restrict: bool) -> Result<(), ConclaveError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConclaveError::storage_error("create vault directory", e.to_string()))?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, &bytes).map_err(|e| ConclaveError::storage_error("write vault file", e.to_string()))?;
    std::fs::rename(&temp_path, path).map_err(|e| ConclaveError::storage_error("rename vault file", e.to_string()))?;
    if restrict {
        #[cfg(target_family = "unix")]
        set_file_permissions(path)?;
    }
    Ok(())
}

#[cfg(target_family = "unix")]
fn validate_file_permissions(path: &Path) -> Result<(), ConclaveError> {
    use std::os::unix::fs::MetadataExt;
    let mode = std::fs::metadata(path)
        .map_err(|e| ConclaveError::storage_error("stat secrets file", e.to_string()))?
        .mode()
        & 0o777;
    if mode != 0o600 {
        return Err(ConclaveError::InsecureFilePermissions { path: path.display().to_string(), mode });
    }
    Ok(())
}

#[cfg(target_family = "unix")]
fn set_file_permissions(path: &Path) -> Result<(), ConclaveError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .map_err(|e| ConclaveError::storage_error("stat secrets file", e.to_string()))?
        .permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)
        .map_err(|e| ConclaveError::storage_error("set secrets file permissions", e.to_string()))?;
    Ok(())
}
