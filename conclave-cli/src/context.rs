use crate::cli::Cli;
use alloy_primitives::Address;
use conclave_core::foundation::{ChainId, ConclaveError};
use conclave_core::infrastructure::config::AppConfig;
use conclave_core::infrastructure::remote::HttpCosigningService;
use conclave_core::infrastructure::rpc::HttpChainRpc;
use conclave_core::infrastructure::storage::FileTransactionStore;
use conclave_core::infrastructure::vault::Vault;

/// Everything a command handler needs, constructed once at startup and
/// passed by handle. No process-wide singletons.
pub struct CommandContext {
    pub config: AppConfig,
    pub chain_name: String,
    pub chain_id: ChainId,
    pub account: Address,
    pub store: FileTransactionStore,
    pub vault: Vault,
    pub chain_rpc: HttpChainRpc,
    pub remote: HttpCosigningService,
}

impl CommandContext {
    pub fn build(cli: &Cli, config: AppConfig) -> Result<Self, ConclaveError> {
        let (chain_name, profile) = {
            let (name, profile) = config.chain(cli.chain.as_deref())?;
            (name.to_string(), profile.clone())
        };
        let chain_id = ChainId::new(profile.chain_id);

        let account = match &cli.account {
            Some(raw) => parse_address(raw)?,
            None => profile.account.ok_or_else(|| {
                ConclaveError::ConfigError(format!("no --account given and chain {chain_name} configures none"))
            })?,
        };

        let store = FileTransactionStore::for_account(&config.data_dir, chain_id, account);
        let vault = Vault::new(&config.data_dir);
        let chain_rpc = HttpChainRpc::new(&profile.rpc_url);
        let remote = HttpCosigningService::new(&profile.service_url);

        Ok(Self { config, chain_name, chain_id, account, store, vault, chain_rpc, remote })
    }
}

pub fn parse_address(raw: &str) -> Result<Address, ConclaveError> {
    raw.parse().map_err(|_| ConclaveError::InvalidAddress(raw.to_string()))
}
