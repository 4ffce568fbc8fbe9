use crate::fixtures::{
    address_of_secret, confirmation, fast_kdf, test_address, MetadataBuilder, RemoteRecordBuilder, TEST_CHAIN_ID,
    TEST_PASSWORD, TEST_SECRET_A,
};
use alloy_primitives::{Address, Bytes, U256};
use conclave_core::application::{
    create_transaction, execute_transaction, reject_transaction, sign_transaction, NextAction, SyncEngine,
    TransactionDraft,
};
use conclave_core::domain::readiness::evaluate;
use conclave_core::domain::{MergeOutcome, TxStatus};
use conclave_core::foundation::ConclaveError;
use conclave_core::infrastructure::remote::MockCosigningService;
use conclave_core::infrastructure::rpc::MockChainRpc;
use conclave_core::infrastructure::storage::{MemoryTransactionStore, TransactionStore};
use conclave_core::infrastructure::vault::Vault;

const ACCOUNT: u8 = 0x5A;

struct Harness {
    _dir: tempfile::TempDir,
    vault: Vault,
    store: MemoryTransactionStore,
    remote: MockCosigningService,
    account: Address,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let vault = Vault::new(dir.path()).with_kdf_params(fast_kdf());
        Self {
            _dir: dir,
            vault,
            store: MemoryTransactionStore::new(),
            remote: MockCosigningService::new(),
            account: test_address(ACCOUNT),
        }
    }
}

#[tokio::test]
async fn full_lifecycle_import_create_sign_push_pull_execute() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let owner_b = test_address(0xBB);
    let chain = MockChainRpc::new(vec![wallet.address, owner_b], 2, 0);

    // Create: nonce fetched live, record lands Pending with no signatures.
    let draft = TransactionDraft::call(test_address(0xD0), U256::ZERO, Bytes::new());
    let record = create_transaction(&harness.store, &chain, harness.account, TEST_CHAIN_ID, draft, wallet.address)
        .await
        .expect("create");
    let tx_id = record.tx_id;
    assert_eq!(record.status, TxStatus::Pending);
    assert_eq!(record.metadata.nonce, 0);
    assert!(record.signatures.is_empty());

    // Sign with the imported wallet: one signature, Signed, not yet ready.
    let outcome = sign_transaction(
        &harness.store,
        &harness.vault,
        None,
        &chain,
        &wallet,
        Some(TEST_PASSWORD),
        &tx_id,
    )
    .await
    .expect("sign");
    assert_eq!(outcome.merge, MergeOutcome::Added);
    assert_eq!(outcome.record.signer_count(), 1);
    assert_eq!(outcome.record.status, TxStatus::Signed);
    assert!(!outcome.readiness.ready);
    assert_eq!(outcome.next_actions, vec![NextAction::Push]);
    // 65-byte recoverable signature from the local secret.
    assert_eq!(outcome.record.signatures[0].payload.len(), 65);
    assert_eq!(outcome.record.signatures[0].signer, wallet.address);

    // Push: remote had no such record, so it is proposed with our signature.
    let sync = SyncEngine::new(&harness.store, &harness.remote, harness.account, TEST_CHAIN_ID, wallet.address);
    let push_report = sync.push().await.expect("push");
    assert_eq!(push_report.proposed, 1);
    let remote_record = harness.remote.record(&tx_id).expect("remote record");
    assert_eq!(remote_record.proposer, Some(wallet.address));
    assert_eq!(remote_record.confirmations.len(), 1);

    // Owner B confirms out-of-band; pull brings the signature home without
    // touching the status.
    harness.remote.seed_confirmation(&tx_id, confirmation(owner_b, b"signature-from-b", 99)).expect("seed");
    let pull_report = sync.pull().await.expect("pull");
    assert_eq!(pull_report.updated, 1);
    assert_eq!(pull_report.new_signatures, 1);

    let record = harness.store.get_record(&tx_id).unwrap().unwrap();
    assert_eq!(record.signer_count(), 2);
    assert_eq!(record.status, TxStatus::Signed);

    // Readiness against the live threshold now reports ready.
    let readiness = evaluate(&record, &[wallet.address, owner_b], 2);
    assert!(readiness.ready);

    // Execute: broadcast happens, the record becomes terminal.
    let executed = execute_transaction(&harness.store, &chain, &tx_id, wallet.address).await.expect("execute");
    assert_eq!(executed.record.status, TxStatus::Executed);
    assert_eq!(chain.broadcast_count(), 1);
    let call = chain.last_broadcast().expect("broadcast");
    assert_eq!(call.account, harness.account);
    assert_eq!(call.sender, wallet.address);

    // Terminal: no further signatures.
    let err = harness
        .store
        .add_signature(&tx_id, crate::fixtures::signature(owner_b, b"late", 1))
        .unwrap_err();
    assert!(matches!(err, ConclaveError::TerminalRecord { .. }));
}

#[tokio::test]
async fn signing_twice_replaces_nothing() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let chain = MockChainRpc::new(vec![wallet.address], 1, 0);

    let draft = TransactionDraft::call(test_address(0xD0), U256::ZERO, Bytes::new());
    let record = create_transaction(&harness.store, &chain, harness.account, TEST_CHAIN_ID, draft, wallet.address)
        .await
        .expect("create");

    let first = sign_transaction(&harness.store, &harness.vault, None, &chain, &wallet, Some(TEST_PASSWORD), &record.tx_id)
        .await
        .expect("sign");
    assert_eq!(first.merge, MergeOutcome::Added);

    // Deterministic signature over the same digest: the second pass is a no-op.
    let second = sign_transaction(&harness.store, &harness.vault, None, &chain, &wallet, Some(TEST_PASSWORD), &record.tx_id)
        .await
        .expect("sign again");
    assert_eq!(second.merge, MergeOutcome::Unchanged);
    assert_eq!(second.record.signer_count(), 1);
    // Single-owner account: one signature is enough.
    assert!(second.readiness.ready);
    assert!(second.next_actions.contains(&NextAction::Execute));
}

#[tokio::test]
async fn non_owner_cannot_sign() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("stranger", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    // The wallet is not in the owner set.
    let chain = MockChainRpc::new(vec![test_address(0xBB)], 1, 0);

    let draft = TransactionDraft::call(test_address(0xD0), U256::ZERO, Bytes::new());
    let record = create_transaction(&harness.store, &chain, harness.account, TEST_CHAIN_ID, draft, wallet.address)
        .await
        .expect("create");

    let err = sign_transaction(&harness.store, &harness.vault, None, &chain, &wallet, Some(TEST_PASSWORD), &record.tx_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ConclaveError::NotAnOwner { .. }));
    assert!(harness.store.get_record(&record.tx_id).unwrap().unwrap().signatures.is_empty());
}

#[tokio::test]
async fn wrong_password_does_not_sign() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let chain = MockChainRpc::new(vec![wallet.address], 1, 0);

    let draft = TransactionDraft::call(test_address(0xD0), U256::ZERO, Bytes::new());
    let record = create_transaction(&harness.store, &chain, harness.account, TEST_CHAIN_ID, draft, wallet.address)
        .await
        .expect("create");

    let err = sign_transaction(&harness.store, &harness.vault, None, &chain, &wallet, Some("nope"), &record.tx_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ConclaveError::WrongPassword));
    let reloaded = harness.store.get_record(&record.tx_id).unwrap().unwrap();
    assert_eq!(reloaded.status, TxStatus::Pending);
    assert!(reloaded.signatures.is_empty());
}

#[tokio::test]
async fn execute_below_threshold_is_refused() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let owner_b = test_address(0xBB);
    let chain = MockChainRpc::new(vec![wallet.address, owner_b], 2, 0);

    let draft = TransactionDraft::call(test_address(0xD0), U256::ZERO, Bytes::new());
    let record = create_transaction(&harness.store, &chain, harness.account, TEST_CHAIN_ID, draft, wallet.address)
        .await
        .expect("create");
    sign_transaction(&harness.store, &harness.vault, None, &chain, &wallet, Some(TEST_PASSWORD), &record.tx_id)
        .await
        .expect("sign");

    let err = execute_transaction(&harness.store, &chain, &record.tx_id, wallet.address).await.unwrap_err();
    assert!(matches!(err, ConclaveError::ThresholdNotMet { required: 2, collected: 1 }));
    assert_eq!(chain.broadcast_count(), 0);
}

#[tokio::test]
async fn readiness_ignores_signatures_from_non_owners() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let owner_b = test_address(0xBB);
    let stranger = test_address(0xEE);
    let chain = MockChainRpc::new(vec![wallet.address, owner_b], 2, 0);

    let draft = TransactionDraft::call(test_address(0xD0), U256::ZERO, Bytes::new());
    let record = create_transaction(&harness.store, &chain, harness.account, TEST_CHAIN_ID, draft, wallet.address)
        .await
        .expect("create");
    sign_transaction(&harness.store, &harness.vault, None, &chain, &wallet, Some(TEST_PASSWORD), &record.tx_id)
        .await
        .expect("sign");
    harness
        .store
        .add_signature(&record.tx_id, crate::fixtures::signature(stranger, b"not-an-owner", 7))
        .expect("stranger signature");

    // Two signatures locally, but only one from an owner.
    let err = execute_transaction(&harness.store, &chain, &record.tx_id, wallet.address).await.unwrap_err();
    assert!(matches!(err, ConclaveError::ThresholdNotMet { required: 2, collected: 1 }));
}

#[tokio::test]
async fn reject_is_terminal() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let chain = MockChainRpc::new(vec![wallet.address], 1, 0);

    let draft = TransactionDraft::call(test_address(0xD0), U256::ZERO, Bytes::new());
    let record = create_transaction(&harness.store, &chain, harness.account, TEST_CHAIN_ID, draft, wallet.address)
        .await
        .expect("create");

    let rejected = reject_transaction(&harness.store, &record.tx_id).expect("reject");
    assert_eq!(rejected.status, TxStatus::Rejected);

    let err = sign_transaction(&harness.store, &harness.vault, None, &chain, &wallet, Some(TEST_PASSWORD), &record.tx_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ConclaveError::TerminalRecord { .. }));

    let err = execute_transaction(&harness.store, &chain, &record.tx_id, wallet.address).await.unwrap_err();
    assert!(matches!(err, ConclaveError::TerminalRecord { .. }));
}

#[tokio::test]
async fn pulled_proposal_can_be_signed_locally() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let owner_b = test_address(0xBB);
    let chain = MockChainRpc::new(vec![wallet.address, owner_b], 2, 0);

    // Someone else proposed this transaction remotely.
    let metadata = MetadataBuilder::default().to(test_address(0xD0)).nonce(0).build();
    harness.remote.seed_record(
        RemoteRecordBuilder::new(harness.account, metadata)
            .proposer(owner_b)
            .confirmation(confirmation(owner_b, b"sig-b", 10))
            .build(),
    );

    let sync = SyncEngine::new(&harness.store, &harness.remote, harness.account, TEST_CHAIN_ID, wallet.address);
    let report = sync.pull().await.expect("pull");
    assert_eq!(report.imported, 1);

    let tx_id = harness.store.list_records(Default::default()).unwrap()[0].tx_id;
    let outcome = sign_transaction(&harness.store, &harness.vault, None, &chain, &wallet, Some(TEST_PASSWORD), &tx_id)
        .await
        .expect("sign");
    assert_eq!(outcome.record.signer_count(), 2);
    assert!(outcome.readiness.ready);
    assert_eq!(outcome.record.status, TxStatus::Signed);
}

#[tokio::test]
async fn address_derivation_is_deterministic() {
    let harness = Harness::new();
    let wallet = harness.vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    assert_eq!(wallet.address, address_of_secret(&TEST_SECRET_A));
}
