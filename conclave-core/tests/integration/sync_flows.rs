use crate::fixtures::{
    confirmation, signature, test_address, tx_id_for, MetadataBuilder, RemoteRecordBuilder, TEST_CHAIN_ID,
};
use conclave_core::application::{PullOutcome, PushOutcome, SyncEngine};
use conclave_core::domain::TxStatus;
use conclave_core::foundation::ConclaveError;
use conclave_core::infrastructure::remote::MockCosigningService;
use conclave_core::infrastructure::storage::{MemoryTransactionStore, RecordFilter, TransactionStore};
use alloy_primitives::Address;

const ACCOUNT: u8 = 0x5A;

fn setup() -> (MemoryTransactionStore, MockCosigningService, Address) {
    (MemoryTransactionStore::new(), MockCosigningService::new(), test_address(ACCOUNT))
}

fn engine<'a>(
    store: &'a MemoryTransactionStore,
    remote: &'a MockCosigningService,
    account: Address,
    active: Address,
) -> SyncEngine<'a> {
    SyncEngine::new(store, remote, account, TEST_CHAIN_ID, active)
}

#[tokio::test]
async fn pull_imports_unknown_record_as_pending() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let owner_b = test_address(0xBB);
    let metadata = MetadataBuilder::default().build();
    let remote_record = RemoteRecordBuilder::new(account, metadata)
        .proposer(owner_a)
        .confirmation(confirmation(owner_a, b"sig-a", 10))
        .confirmation(confirmation(owner_b, b"sig-b", 20))
        .build();

    let sync = engine(&store, &remote, account, owner_a);
    let outcome = sync.pull_one(&remote_record).expect("pull");
    assert_eq!(outcome, PullOutcome::Imported { signatures: 2 });

    let record = store.get_record(&remote_record.tx_id).unwrap().expect("imported");
    // The engine never promotes status; that belongs to the signing action.
    assert_eq!(record.status, TxStatus::Pending);
    assert_eq!(record.creator, owner_a);
    assert_eq!(record.signer_count(), 2);
}

#[tokio::test]
async fn pull_creator_falls_back_to_first_confirmer() {
    let (store, remote, account) = setup();
    let owner_b = test_address(0xBB);
    let owner_c = test_address(0xCC);
    let metadata = MetadataBuilder::default().build();
    let remote_record = RemoteRecordBuilder::new(account, metadata)
        .confirmation(confirmation(owner_c, b"sig-c", 30))
        .confirmation(confirmation(owner_b, b"sig-b", 20))
        .build();

    let sync = engine(&store, &remote, account, owner_b);
    sync.pull_one(&remote_record).expect("pull");
    let record = store.get_record(&remote_record.tx_id).unwrap().expect("imported");
    // Oldest confirmation wins the creator slot.
    assert_eq!(record.creator, owner_b);
}

#[tokio::test]
async fn pull_merge_preserves_local_payload() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let owner_b = test_address(0xBB);
    let metadata = MetadataBuilder::default().build();
    let tx_id = tx_id_for(account, &metadata);

    store.create_record(tx_id, account, TEST_CHAIN_ID, metadata.clone(), owner_a).expect("create");
    store.add_signature(&tx_id, signature(owner_a, b"local-a", 5)).expect("sign");

    // Remote carries a different payload for A plus a new signer B.
    let remote_record = RemoteRecordBuilder::new(account, metadata)
        .confirmation(confirmation(owner_a, b"remote-a", 50))
        .confirmation(confirmation(owner_b, b"remote-b", 60))
        .build();

    let sync = engine(&store, &remote, account, owner_a);
    let outcome = sync.pull_one(&remote_record).expect("pull");
    assert_eq!(outcome, PullOutcome::Updated { new_signatures: 1 });

    let record = store.get_record(&tx_id).unwrap().unwrap();
    assert_eq!(record.signer_count(), 2);
    // Local A untouched; only B imported.
    assert_eq!(record.signature_of(owner_a).unwrap().payload.as_ref(), b"local-a");
    assert_eq!(record.signature_of(owner_b).unwrap().payload.as_ref(), b"remote-b");
}

#[tokio::test]
async fn pull_rejects_record_with_mismatched_identifier() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let metadata = MetadataBuilder::default().build();
    let mut remote_record = RemoteRecordBuilder::new(account, metadata).build();
    remote_record.tx_id = tx_id_for(account, &MetadataBuilder::default().nonce(99).build());

    let sync = engine(&store, &remote, account, owner_a);
    let err = sync.pull_one(&remote_record).unwrap_err();
    assert!(matches!(err, ConclaveError::ParseError(_)));
    assert!(store.get_record(&remote_record.tx_id).unwrap().is_none());
}

#[tokio::test]
async fn push_requires_our_signature() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let owner_b = test_address(0xBB);
    let metadata = MetadataBuilder::default().build();
    let tx_id = tx_id_for(account, &metadata);
    store.create_record(tx_id, account, TEST_CHAIN_ID, metadata, owner_b).expect("create");
    store.add_signature(&tx_id, signature(owner_b, b"sig-b", 1)).expect("sign");

    let sync = engine(&store, &remote, account, owner_a);
    let record = store.get_record(&tx_id).unwrap().unwrap();
    let err = sync.push_one(&record).await.unwrap_err();
    assert!(matches!(err, ConclaveError::NotSignedLocally { .. }));

    // The batch push classifies it as skipped, not failed.
    let report = sync.push().await.expect("push");
    assert_eq!(report.skipped_unsigned, 1);
    assert!(report.failures.is_empty());
    assert_eq!(remote.record_count(), 0);
}

#[tokio::test]
async fn push_proposes_then_confirms_other_signers() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let owner_b = test_address(0xBB);
    let metadata = MetadataBuilder::default().build();
    let tx_id = tx_id_for(account, &metadata);
    store.create_record(tx_id, account, TEST_CHAIN_ID, metadata, owner_a).expect("create");
    store.add_signature(&tx_id, signature(owner_a, b"sig-a", 1)).expect("sign a");
    store.add_signature(&tx_id, signature(owner_b, b"sig-b", 2)).expect("sign b");

    let sync = engine(&store, &remote, account, owner_a);
    let report = sync.push().await.expect("push");
    assert_eq!(report.proposed, 1);
    assert_eq!(report.confirmations_sent, 1);

    let remote_record = remote.record(&tx_id).expect("proposed");
    assert_eq!(remote_record.proposer, Some(owner_a));
    assert_eq!(remote_record.confirmations.len(), 2);

    // Second push finds nothing to send.
    let report = sync.push().await.expect("push again");
    assert_eq!(report.proposed, 0);
    assert_eq!(report.in_sync, 1);
    assert_eq!(report.confirmations_sent, 0);
}

#[tokio::test]
async fn push_sends_only_missing_confirmations() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let owner_b = test_address(0xBB);
    let metadata = MetadataBuilder::default().build();
    let tx_id = tx_id_for(account, &metadata);

    // Remote already knows the proposal with A's confirmation.
    remote.seed_record(
        RemoteRecordBuilder::new(account, metadata.clone())
            .proposer(owner_a)
            .confirmation(confirmation(owner_a, b"sig-a", 1))
            .build(),
    );

    store.create_record(tx_id, account, TEST_CHAIN_ID, metadata, owner_a).expect("create");
    store.add_signature(&tx_id, signature(owner_a, b"sig-a", 1)).expect("sign a");
    store.add_signature(&tx_id, signature(owner_b, b"sig-b", 2)).expect("sign b");

    let sync = engine(&store, &remote, account, owner_a);
    let record = store.get_record(&tx_id).unwrap().unwrap();
    let outcome = sync.push_one(&record).await.expect("push");
    assert_eq!(outcome, PushOutcome::Updated { confirmations_sent: 1 });
    assert_eq!(remote.record(&tx_id).unwrap().confirmations.len(), 2);
}

#[tokio::test]
async fn sync_is_idempotent() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let owner_b = test_address(0xBB);
    let metadata = MetadataBuilder::default().build();
    let tx_id = tx_id_for(account, &metadata);

    remote.seed_record(
        RemoteRecordBuilder::new(account, metadata.clone())
            .proposer(owner_b)
            .confirmation(confirmation(owner_b, b"sig-b", 1))
            .build(),
    );
    store.create_record(tx_id, account, TEST_CHAIN_ID, metadata, owner_a).expect("create");
    store.add_signature(&tx_id, signature(owner_a, b"sig-a", 2)).expect("sign");

    let sync = engine(&store, &remote, account, owner_a);
    let first = sync.sync().await.expect("first sync");
    assert_eq!(first.pull.new_signatures, 1);
    assert_eq!(first.push.confirmations_sent, 1);

    // No external change: the second run moves nothing.
    let second = sync.sync().await.expect("second sync");
    assert_eq!(second.pull.new_signatures, 0);
    assert_eq!(second.pull.updated, 0);
    assert_eq!(second.push.confirmations_sent, 0);
    assert_eq!(second.push.in_sync, 1);
}

#[tokio::test]
async fn sync_makes_freshly_pulled_record_push_eligible() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let metadata = MetadataBuilder::default().build();
    let tx_id = tx_id_for(account, &metadata);

    // Remote knows a proposal that already carries our confirmation; the
    // local store has never seen it.
    remote.seed_record(
        RemoteRecordBuilder::new(account, metadata)
            .proposer(owner_a)
            .confirmation(confirmation(owner_a, b"sig-a", 1))
            .build(),
    );

    let sync = engine(&store, &remote, account, owner_a);
    let report = sync.sync().await.expect("sync");
    assert_eq!(report.pull.imported, 1);
    // Pull finished first, so the imported record reached the push phase
    // within the same run instead of being skipped as unknown.
    assert_eq!(report.push.in_sync, 1);
    assert_eq!(report.push.skipped_unsigned, 0);
    assert!(store.get_record(&tx_id).unwrap().is_some());
}

#[tokio::test]
async fn one_failing_record_does_not_abort_the_batch() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);

    let metadata_1 = MetadataBuilder::default().nonce(0).build();
    let metadata_2 = MetadataBuilder::default().nonce(1).build();
    let id_1 = tx_id_for(account, &metadata_1);
    let id_2 = tx_id_for(account, &metadata_2);
    store.create_record(id_1, account, TEST_CHAIN_ID, metadata_1, owner_a).expect("create 1");
    store.create_record(id_2, account, TEST_CHAIN_ID, metadata_2, owner_a).expect("create 2");
    store.add_signature(&id_1, signature(owner_a, b"sig-1", 1)).expect("sign 1");
    store.add_signature(&id_2, signature(owner_a, b"sig-2", 2)).expect("sign 2");

    remote.fail_calls_for(id_1);
    let sync = engine(&store, &remote, account, owner_a);
    let report = sync.push().await.expect("push");

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].tx_id, id_1);
    assert_eq!(report.proposed, 1);
    assert!(remote.record(&id_2).is_some());

    // The failed record is picked up once the remote recovers.
    remote.clear_failures();
    let report = sync.push().await.expect("push after recovery");
    assert_eq!(report.proposed, 1);
    assert!(remote.record(&id_1).is_some());
}

#[tokio::test]
async fn pull_skips_terminal_local_records() {
    let (store, remote, account) = setup();
    let owner_a = test_address(0xAA);
    let owner_b = test_address(0xBB);
    let metadata = MetadataBuilder::default().build();
    let tx_id = tx_id_for(account, &metadata);
    store.create_record(tx_id, account, TEST_CHAIN_ID, metadata.clone(), owner_a).expect("create");
    store.set_status(&tx_id, TxStatus::Rejected, None).expect("reject");

    let remote_record =
        RemoteRecordBuilder::new(account, metadata).confirmation(confirmation(owner_b, b"sig-b", 1)).build();
    let sync = engine(&store, &remote, account, owner_a);
    assert_eq!(sync.pull_one(&remote_record).expect("pull"), PullOutcome::Skipped);
    assert_eq!(store.get_record(&tx_id).unwrap().unwrap().signer_count(), 0);
}

#[tokio::test]
async fn push_ignores_records_for_other_accounts() {
    let (store, remote, account) = setup();
    let other_account = test_address(0x66);
    let owner_a = test_address(0xAA);
    let metadata = MetadataBuilder::default().build();
    let id = tx_id_for(other_account, &metadata);
    store.create_record(id, other_account, TEST_CHAIN_ID, metadata, owner_a).expect("create");
    store.add_signature(&id, signature(owner_a, b"sig", 1)).expect("sign");

    let sync = engine(&store, &remote, account, owner_a);
    let report = sync.push().await.expect("push");
    assert_eq!(report.proposed + report.updated + report.in_sync + report.skipped_unsigned, 0);
    assert_eq!(remote.record_count(), 0);
}

#[tokio::test]
async fn record_filter_scopes_listing() {
    let (store, _remote, account) = setup();
    let owner_a = test_address(0xAA);
    let metadata = MetadataBuilder::default().build();
    let id = tx_id_for(account, &metadata);
    store.create_record(id, account, TEST_CHAIN_ID, metadata, owner_a).expect("create");

    let pending = store.list_records(RecordFilter::with_status(TxStatus::Pending)).unwrap();
    let executed = store.list_records(RecordFilter::with_status(TxStatus::Executed)).unwrap();
    assert_eq!(pending.len(), 1);
    assert!(executed.is_empty());
}
