use crate::cli::WalletCommand;
use crate::context::parse_address;
use conclave_core::foundation::util::encoding::parse_hex_32bytes;
use conclave_core::foundation::{ConclaveError, IdentityId};
use conclave_core::infrastructure::config::AppConfig;
use conclave_core::infrastructure::vault::{prompt_hidden_input, Vault};
use zeroize::Zeroize;

pub async fn run(config: &AppConfig, command: &WalletCommand) -> Result<(), ConclaveError> {
    let vault = Vault::new(&config.data_dir);
    match command {
        WalletCommand::Import { name } => import(&vault, name),
        WalletCommand::ImportExternal { name, address, derivation_path } => {
            let address = parse_address(address)?;
            let identity = vault.import_external_identity(name, address, derivation_path.clone())?;
            println!("imported external identity {} ({})", identity.id, identity.address);
            Ok(())
        }
        WalletCommand::List => list(&vault),
        WalletCommand::Use { id } => {
            vault.set_active(&IdentityId::from(id.as_str()))?;
            println!("active identity: {id}");
            Ok(())
        }
        WalletCommand::Rename { id, name } => {
            vault.rename(&IdentityId::from(id.as_str()), name)?;
            println!("renamed {id} to {name}");
            Ok(())
        }
        WalletCommand::Remove { id } => {
            vault.remove(&IdentityId::from(id.as_str()))?;
            println!("removed {id}");
            Ok(())
        }
    }
}

fn import(vault: &Vault, name: &str) -> Result<(), ConclaveError> {
    let secret_hex = prompt_hidden_input("Signing key (32-byte hex): ")?;
    let mut secret = parse_hex_32bytes(&secret_hex)?;

    let password = prompt_hidden_input("Password: ")?;
    let confirm = prompt_hidden_input("Confirm password: ")?;
    if password != confirm {
        secret.zeroize();
        return Err(ConclaveError::ParseError("passwords do not match".to_string()));
    }

    let result = vault.import_local_secret(name, &secret, &password);
    secret.zeroize();
    let identity = result?;
    println!("imported identity {} ({})", identity.id, identity.address);
    Ok(())
}

fn list(vault: &Vault) -> Result<(), ConclaveError> {
    let identities = vault.list()?;
    if identities.is_empty() {
        println!("no wallet identities");
        return Ok(());
    }
    let active = vault.active()?.map(|identity| identity.id);
    for identity in identities {
        let marker = if active.as_ref() == Some(&identity.id) { "*" } else { " " };
        println!("{} {}  {}  {}  {}", marker, identity.id, identity.name, identity.kind, identity.address);
    }
    Ok(())
}
