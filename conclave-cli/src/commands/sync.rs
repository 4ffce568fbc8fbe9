use crate::commands::resolve_identity;
use crate::context::CommandContext;
use conclave_core::application::{PullReport, PushReport, SyncEngine};
use conclave_core::foundation::ConclaveError;

fn engine<'a>(ctx: &'a CommandContext) -> Result<SyncEngine<'a>, ConclaveError> {
    let active = resolve_identity(&ctx.vault, None)?;
    Ok(SyncEngine::new(&ctx.store, &ctx.remote, ctx.account, ctx.chain_id, active.address))
}

fn print_pull(report: &PullReport) {
    println!(
        "pull: {} imported, {} updated, {} skipped, {} new signatures",
        report.imported, report.updated, report.skipped, report.new_signatures
    );
    for failure in &report.failures {
        println!("  failed {}: {}", failure.tx_id, failure.error);
    }
}

fn print_push(report: &PushReport) {
    println!(
        "push: {} proposed, {} updated, {} in sync, {} without our signature, {} confirmations sent",
        report.proposed, report.updated, report.in_sync, report.skipped_unsigned, report.confirmations_sent
    );
    for failure in &report.failures {
        println!("  failed {}: {}", failure.tx_id, failure.error);
    }
}

fn fail_on_batch_errors(failed: usize) -> Result<(), ConclaveError> {
    if failed > 0 {
        return Err(ConclaveError::Message(format!("{failed} record(s) failed; see output above")));
    }
    Ok(())
}

pub async fn pull(ctx: &CommandContext) -> Result<(), ConclaveError> {
    let report = engine(ctx)?.pull().await?;
    print_pull(&report);
    fail_on_batch_errors(report.failures.len())
}

pub async fn push(ctx: &CommandContext) -> Result<(), ConclaveError> {
    let report = engine(ctx)?.push().await?;
    print_push(&report);
    fail_on_batch_errors(report.failures.len())
}

pub async fn sync(ctx: &CommandContext) -> Result<(), ConclaveError> {
    let report = engine(ctx)?.sync().await?;
    print_pull(&report.pull);
    print_push(&report.push);
    fail_on_batch_errors(report.pull.failures.len() + report.push.failures.len())
}
