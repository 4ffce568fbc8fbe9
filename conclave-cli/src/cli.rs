use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(about = "m-of-n multisig transaction coordinator", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Chain profile to operate on (defaults to config default_chain)
    #[arg(long, global = true)]
    pub chain: Option<String>,

    /// Multisig account address (defaults to the chain profile's account)
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Log filter (e.g. "info", "debug", "reqwest=debug"); defaults to the
    /// configured level
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new transaction proposal
    Create(CreateArgs),
    /// Sign a transaction with the active (or named) wallet
    Sign(TxArgs),
    /// Execute a transaction that reached its threshold
    Execute(TxArgs),
    /// Reject a pending transaction
    Reject(TxArgs),
    /// Publish local signatures to the co-signing service
    Push,
    /// Import proposals and confirmations from the co-signing service
    Pull,
    /// Pull, then push
    Sync,
    /// List local transaction records
    List(ListArgs),
    /// Show one transaction record in full
    Show(TxArgs),
    /// Wallet identity management
    #[command(subcommand)]
    Wallet(WalletCommand),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Destination address
    #[arg(long)]
    pub to: String,

    /// Native value in wei (decimal or 0x-hex)
    #[arg(long, default_value = "0")]
    pub value: String,

    /// Call data as hex
    #[arg(long, default_value = "0x")]
    pub data: String,

    /// Use a delegated call instead of an ordinary call
    #[arg(long)]
    pub delegate: bool,

    /// Pin the account nonce instead of fetching it
    #[arg(long)]
    pub nonce: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TxArgs {
    /// Transaction identifier (selected interactively when omitted)
    pub tx_id: Option<String>,

    /// Wallet identity to use (defaults to the active identity)
    #[arg(long)]
    pub wallet: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only records with this status (pending, signed, executed, rejected)
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Import a locally-held signing secret (prompts for key and password)
    Import {
        #[arg(long)]
        name: String,
    },
    /// Register a hardware-signer identity (no secret stored)
    ImportExternal {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        derivation_path: Option<String>,
    },
    /// List wallet identities
    List,
    /// Make an identity the active one
    Use { id: String },
    /// Rename an identity
    Rename { id: String, name: String },
    /// Remove an identity and destroy its secret
    Remove { id: String },
}
