pub mod sync;
pub mod transactions;
pub mod wallet;

use conclave_core::domain::{TransactionRecord, TxStatus, WalletIdentity};
use conclave_core::foundation::{ConclaveError, IdentityId, TxId};
use conclave_core::infrastructure::storage::{RecordFilter, TransactionStore};
use conclave_core::infrastructure::vault::Vault;
use std::io::Write;

/// Resolve a transaction id from the argument, or select one interactively
/// from the matching records.
pub fn resolve_tx_id(
    store: &dyn TransactionStore,
    arg: Option<&str>,
    filter: RecordFilter,
) -> Result<TxId, ConclaveError> {
    if let Some(raw) = arg {
        return raw.parse();
    }

    let records = store.list_records(filter)?;
    if records.is_empty() {
        return Err(ConclaveError::RecordNotFound("no matching transaction records".to_string()));
    }
    if records.len() == 1 {
        return Ok(records[0].tx_id);
    }

    println!("Select a transaction:");
    for (index, record) in records.iter().enumerate() {
        println!("  [{}] {} {} -> {} (nonce {})", index + 1, record.status, record.tx_id, record.metadata.to, record.metadata.nonce);
    }
    let line = prompt_line(&format!("Transaction [1-{}]: ", records.len()))?;
    let choice: usize = line.parse().map_err(|_| ConclaveError::ParseError(format!("not a selection: {line}")))?;
    let record = records
        .get(choice.wrapping_sub(1))
        .ok_or_else(|| ConclaveError::ParseError(format!("selection out of range: {choice}")))?;
    Ok(record.tx_id)
}

/// The named identity, or the active one.
pub fn resolve_identity(vault: &Vault, wallet: Option<&str>) -> Result<WalletIdentity, ConclaveError> {
    match wallet {
        Some(id) => vault.get(&IdentityId::from(id)),
        None => vault
            .active()?
            .ok_or_else(|| ConclaveError::IdentityNotFound("no active wallet identity; import one first".to_string())),
    }
}

pub fn parse_status(raw: &str) -> Result<TxStatus, ConclaveError> {
    match raw.to_ascii_lowercase().as_str() {
        "pending" => Ok(TxStatus::Pending),
        "signed" => Ok(TxStatus::Signed),
        "executed" => Ok(TxStatus::Executed),
        "rejected" => Ok(TxStatus::Rejected),
        other => Err(ConclaveError::ParseError(format!("unknown status: {other}"))),
    }
}

pub fn prompt_line(prompt: &str) -> Result<String, ConclaveError> {
    print!("{prompt}");
    std::io::stdout().flush().map_err(|e| ConclaveError::storage_error("flush stdout", e.to_string()))?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| ConclaveError::storage_error("read input", e.to_string()))?;
    Ok(line.trim().to_string())
}

pub fn print_record_line(record: &TransactionRecord) {
    println!(
        "{}  {:<8}  to {}  value {}  nonce {}  signatures {}",
        record.tx_id,
        record.status.to_string(),
        record.metadata.to,
        record.metadata.value,
        record.metadata.nonce,
        record.signer_count()
    );
}

pub fn print_record_full(record: &TransactionRecord) {
    println!("transaction {}", record.tx_id);
    println!("  account:  {}", record.account);
    println!("  chain:    {}", record.chain_id);
    println!("  status:   {}", record.status);
    println!("  to:       {}", record.metadata.to);
    println!("  value:    {}", record.metadata.value);
    println!("  data:     {}", record.metadata.data);
    println!("  kind:     {:?}", record.metadata.kind);
    println!("  nonce:    {}", record.metadata.nonce);
    println!("  creator:  {}", record.creator);
    println!("  signatures ({}):", record.signer_count());
    for entry in &record.signatures {
        println!("    {}  at {}  {}", entry.signer, entry.timestamp_millis, entry.payload);
    }
    if let Some(execution) = &record.execution {
        println!("  executed: {} at {}", execution.tx_hash, execution.executed_at_millis);
    }
}
