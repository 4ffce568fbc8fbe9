mod cli;
mod commands;
mod context;

use clap::Parser;
use cli::{Cli, Command};
use conclave_core::foundation::ConclaveError;
use conclave_core::infrastructure::config::{self, AppConfig};
use conclave_core::infrastructure::logging::init_logger;
use context::CommandContext;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    let filters = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logger(config.log_dir.as_deref(), &filters);

    if let Err(err) = run(&cli, config).await {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, config: AppConfig) -> Result<(), ConclaveError> {
    if let Command::Wallet(command) = &cli.command {
        return commands::wallet::run(&config, command).await;
    }

    let ctx = CommandContext::build(cli, config)?;
    match &cli.command {
        Command::Create(args) => commands::transactions::create(&ctx, args).await,
        Command::Sign(args) => commands::transactions::sign(&ctx, args).await,
        Command::Execute(args) => commands::transactions::execute(&ctx, args).await,
        Command::Reject(args) => commands::transactions::reject(&ctx, args),
        Command::Push => commands::sync::push(&ctx).await,
        Command::Pull => commands::sync::pull(&ctx).await,
        Command::Sync => commands::sync::sync(&ctx).await,
        Command::List(args) => commands::transactions::list(&ctx, args),
        Command::Show(args) => commands::transactions::show(&ctx, args),
        Command::Wallet(_) => unreachable!("handled above"),
    }
}
