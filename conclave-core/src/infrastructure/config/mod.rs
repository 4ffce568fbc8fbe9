//! Application configuration: TOML file plus `CONCLAVE_*` env overrides.

use crate::foundation::{ConclaveError, CONFIG_FILE_NAME, CONFIG_PATH_ENV, DATA_DIR_ENV, ENV_PREFIX};
use alloy_primitives::Address;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One chain the tool can operate on.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChainProfile {
    pub chain_id: u64,
    /// EVM JSON-RPC endpoint.
    pub rpc_url: String,
    /// Co-signing service base URL.
    pub service_url: String,
    /// Default multisig account for this chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Address>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub default_chain: String,
    #[serde(default)]
    pub chains: BTreeMap<String, ChainProfile>,
    #[serde(default)]
    pub log_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_chain: String::new(),
            chains: BTreeMap::new(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Resolve a chain profile by name, falling back to the default chain.
    pub fn chain(&self, name: Option<&str>) -> Result<(&str, &ChainProfile), ConclaveError> {
        let name = match name {
            Some(name) => name,
            None if !self.default_chain.is_empty() => self.default_chain.as_str(),
            None => return Err(ConclaveError::ConfigError("no chain given and no default_chain configured".to_string())),
        };
        self.chains
            .get_key_value(name)
            .map(|(key, profile)| (key.as_str(), profile))
            .ok_or_else(|| ConclaveError::ChainNotFound(name.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConclaveError> {
        if self.chains.is_empty() {
            return Err(ConclaveError::ConfigError("no chains configured".to_string()));
        }
        if !self.default_chain.is_empty() && !self.chains.contains_key(&self.default_chain) {
            return Err(ConclaveError::ConfigError(format!("default_chain {} is not a configured chain", self.default_chain)));
        }
        for (name, profile) in &self.chains {
            if profile.chain_id == 0 {
                return Err(ConclaveError::ConfigError(format!("chain {name} has chain_id 0")));
            }
            if profile.rpc_url.trim().is_empty() {
                return Err(ConclaveError::ConfigError(format!("chain {name} has an empty rpc_url")));
            }
            if profile.service_url.trim().is_empty() {
                return Err(ConclaveError::ConfigError(format!("chain {name} has an empty service_url")));
            }
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".conclave"),
        Err(_) => PathBuf::from(".conclave"),
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    default_data_dir().join(CONFIG_FILE_NAME)
}

/// Load configuration with precedence: defaults < TOML file < env overrides.
pub fn load(explicit_path: Option<&Path>) -> Result<AppConfig, ConclaveError> {
    let path = resolve_config_path(explicit_path);
    let figment = Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    let config: AppConfig =
        figment.extract().map_err(|e| ConclaveError::ConfigError(format!("config extraction failed: {e}")))?;
    config.validate()?;
    Ok(config)
}
