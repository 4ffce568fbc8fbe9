use crate::cli::{CreateArgs, ListArgs, TxArgs};
use crate::commands::{parse_status, print_record_full, print_record_line, resolve_identity, resolve_tx_id};
use crate::context::{parse_address, CommandContext};
use alloy_primitives::{Bytes, U256};
use conclave_core::application::{
    create_transaction, execute_transaction, reject_transaction, sign_transaction, NextAction, TransactionDraft,
};
use conclave_core::domain::{CallKind, IdentityKind};
use conclave_core::foundation::util::encoding::parse_hex_bytes;
use conclave_core::foundation::ConclaveError;
use conclave_core::infrastructure::storage::{RecordFilter, TransactionStore};
use conclave_core::infrastructure::vault::prompt_hidden_input;

pub async fn create(ctx: &CommandContext, args: &CreateArgs) -> Result<(), ConclaveError> {
    let creator = resolve_identity(&ctx.vault, None)?;
    let to = parse_address(&args.to)?;
    let value: U256 = args.value.parse().map_err(|_| ConclaveError::InvalidAmount(args.value.clone()))?;
    let data = Bytes::from(parse_hex_bytes(&args.data)?);

    let mut draft = TransactionDraft::call(to, value, data);
    if args.delegate {
        draft = draft.with_kind(CallKind::DelegateCall);
    }
    if let Some(nonce) = args.nonce {
        draft = draft.with_nonce(nonce);
    }

    let record =
        create_transaction(&ctx.store, &ctx.chain_rpc, ctx.account, ctx.chain_id, draft, creator.address).await?;
    println!("created:");
    print_record_full(&record);
    Ok(())
}

pub async fn sign(ctx: &CommandContext, args: &TxArgs) -> Result<(), ConclaveError> {
    let identity = resolve_identity(&ctx.vault, args.wallet.as_deref())?;
    let tx_id = resolve_tx_id(&ctx.store, args.tx_id.as_deref(), RecordFilter::default())?;

    let password = match identity.kind {
        IdentityKind::LocalSecret => Some(prompt_hidden_input(&format!("Password for {}: ", identity.name))?),
        IdentityKind::ExternalSigner => None,
    };

    let outcome =
        sign_transaction(&ctx.store, &ctx.vault, None, &ctx.chain_rpc, &identity, password.as_deref(), &tx_id).await?;

    println!("signed {} as {}", tx_id, identity.address);
    println!(
        "confirmations: {} of {} required ({} missing)",
        outcome.readiness.confirmed.len(),
        outcome.readiness.threshold,
        outcome.readiness.missing
    );
    for action in &outcome.next_actions {
        match action {
            NextAction::Execute => println!("next: threshold reached, `conclave execute {tx_id}`"),
            NextAction::Push => println!("next: share signatures with `conclave push`"),
        }
    }
    Ok(())
}

pub async fn execute(ctx: &CommandContext, args: &TxArgs) -> Result<(), ConclaveError> {
    let identity = resolve_identity(&ctx.vault, args.wallet.as_deref())?;
    let tx_id = resolve_tx_id(&ctx.store, args.tx_id.as_deref(), RecordFilter::default())?;
    let outcome = execute_transaction(&ctx.store, &ctx.chain_rpc, &tx_id, identity.address).await?;
    println!("executed {} as on-chain transaction {}", tx_id, outcome.tx_hash);
    Ok(())
}

pub fn reject(ctx: &CommandContext, args: &TxArgs) -> Result<(), ConclaveError> {
    let tx_id = resolve_tx_id(&ctx.store, args.tx_id.as_deref(), RecordFilter::default())?;
    let record = reject_transaction(&ctx.store, &tx_id)?;
    println!("rejected {}", record.tx_id);
    Ok(())
}

pub fn list(ctx: &CommandContext, args: &ListArgs) -> Result<(), ConclaveError> {
    let filter = match &args.status {
        Some(raw) => RecordFilter::with_status(parse_status(raw)?),
        None => RecordFilter::default(),
    };
    let records = ctx.store.list_records(filter)?;
    if records.is_empty() {
        println!("no transaction records");
        return Ok(());
    }
    for record in &records {
        print_record_line(record);
    }
    Ok(())
}

pub fn show(ctx: &CommandContext, args: &TxArgs) -> Result<(), ConclaveError> {
    let tx_id = resolve_tx_id(&ctx.store, args.tx_id.as_deref(), RecordFilter::default())?;
    let record = ctx
        .store
        .get_record(&tx_id)?
        .ok_or_else(|| ConclaveError::record_not_found(&tx_id))?;
    print_record_full(&record);
    Ok(())
}
