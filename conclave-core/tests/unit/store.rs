use crate::fixtures::{signature, test_address, tx_id_for, MetadataBuilder, TEST_CHAIN_ID};
use conclave_core::domain::{MergeOutcome, TxStatus};
use conclave_core::foundation::ConclaveError;
use conclave_core::infrastructure::storage::{
    FileTransactionStore, MemoryTransactionStore, RecordFilter, TransactionStore,
};
use alloy_primitives::B256;

fn stores() -> (MemoryTransactionStore, tempfile::TempDir, FileTransactionStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let file_store = FileTransactionStore::new(dir.path().join("transactions.json"));
    (MemoryTransactionStore::new(), dir, file_store)
}

fn with_each_store(test: impl Fn(&dyn TransactionStore)) {
    let (memory, _dir, file) = stores();
    test(&memory);
    test(&file);
}

#[test]
fn create_then_get_is_pending_with_empty_signatures() {
    with_each_store(|store| {
        let account = test_address(0xA0);
        let metadata = MetadataBuilder::default().build();
        let id = tx_id_for(account, &metadata);

        store.create_record(id, account, TEST_CHAIN_ID, metadata, test_address(0x01)).expect("create");
        let record = store.get_record(&id).expect("get").expect("present");
        assert_eq!(record.status, TxStatus::Pending);
        assert!(record.signatures.is_empty());
        assert_eq!(record.creator, test_address(0x01));
    });
}

#[test]
fn create_duplicate_fails() {
    with_each_store(|store| {
        let account = test_address(0xA0);
        let metadata = MetadataBuilder::default().build();
        let id = tx_id_for(account, &metadata);

        store.create_record(id, account, TEST_CHAIN_ID, metadata.clone(), test_address(0x01)).expect("create");
        let err = store.create_record(id, account, TEST_CHAIN_ID, metadata, test_address(0x01)).unwrap_err();
        assert!(matches!(err, ConclaveError::DuplicateRecord(_)));
    });
}

#[test]
fn add_signature_replace_rule() {
    with_each_store(|store| {
        let account = test_address(0xA0);
        let metadata = MetadataBuilder::default().build();
        let id = tx_id_for(account, &metadata);
        store.create_record(id, account, TEST_CHAIN_ID, metadata, test_address(0x01)).expect("create");

        let signer = test_address(0xAA);
        assert_eq!(store.add_signature(&id, signature(signer, b"s1", 1)).unwrap(), MergeOutcome::Added);
        // Same payload twice: exactly one entry, unchanged.
        assert_eq!(store.add_signature(&id, signature(signer, b"s1", 2)).unwrap(), MergeOutcome::Unchanged);
        // Later payload replaces.
        assert_eq!(store.add_signature(&id, signature(signer, b"s2", 3)).unwrap(), MergeOutcome::Replaced);

        let record = store.get_record(&id).unwrap().unwrap();
        assert_eq!(record.signer_count(), 1);
        assert_eq!(record.signatures[0].payload.as_ref(), b"s2");
    });
}

#[test]
fn add_signature_unknown_record_fails() {
    with_each_store(|store| {
        let metadata = MetadataBuilder::default().build();
        let id = tx_id_for(test_address(0xA0), &metadata);
        let err = store.add_signature(&id, signature(test_address(0xAA), b"s", 1)).unwrap_err();
        assert!(matches!(err, ConclaveError::RecordNotFound(_)));
    });
}

#[test]
fn terminal_records_accept_no_writes() {
    with_each_store(|store| {
        let account = test_address(0xA0);
        let metadata = MetadataBuilder::default().build();
        let id = tx_id_for(account, &metadata);
        store.create_record(id, account, TEST_CHAIN_ID, metadata, test_address(0x01)).expect("create");
        store.add_signature(&id, signature(test_address(0xAA), b"s1", 1)).expect("sign");
        store.set_status(&id, TxStatus::Executed, Some(B256::repeat_byte(0xEE))).expect("execute");

        let err = store.add_signature(&id, signature(test_address(0xBB), b"s2", 2)).unwrap_err();
        assert!(matches!(err, ConclaveError::TerminalRecord { .. }));

        let err = store.set_status(&id, TxStatus::Rejected, None).unwrap_err();
        assert!(matches!(err, ConclaveError::TerminalRecord { .. }));

        // Signature set unchanged by the refused writes.
        let record = store.get_record(&id).unwrap().unwrap();
        assert_eq!(record.signer_count(), 1);
        assert_eq!(record.status, TxStatus::Executed);
        let execution = record.execution.expect("execution reference");
        assert_eq!(execution.tx_hash, B256::repeat_byte(0xEE));
    });
}

#[test]
fn status_machine_rejects_backward_transitions() {
    with_each_store(|store| {
        let account = test_address(0xA0);
        let metadata = MetadataBuilder::default().build();
        let id = tx_id_for(account, &metadata);
        store.create_record(id, account, TEST_CHAIN_ID, metadata, test_address(0x01)).expect("create");
        store.set_status(&id, TxStatus::Signed, None).expect("signed");

        let err = store.set_status(&id, TxStatus::Pending, None).unwrap_err();
        assert!(matches!(err, ConclaveError::InvalidStatusTransition { .. }));
    });
}

#[test]
fn remove_is_idempotent() {
    with_each_store(|store| {
        let account = test_address(0xA0);
        let metadata = MetadataBuilder::default().build();
        let id = tx_id_for(account, &metadata);
        store.create_record(id, account, TEST_CHAIN_ID, metadata, test_address(0x01)).expect("create");

        store.remove_record(&id).expect("remove");
        assert!(store.get_record(&id).unwrap().is_none());
        // Absent id is not an error.
        store.remove_record(&id).expect("remove again");
    });
}

#[test]
fn list_preserves_insertion_order_and_filters() {
    with_each_store(|store| {
        let account = test_address(0xA0);
        let mut ids = Vec::new();
        for nonce in 0..3 {
            let metadata = MetadataBuilder::default().nonce(nonce).build();
            let id = tx_id_for(account, &metadata);
            store.create_record(id, account, TEST_CHAIN_ID, metadata, test_address(0x01)).expect("create");
            ids.push(id);
        }
        store.set_status(&ids[1], TxStatus::Signed, None).expect("signed");

        let all = store.list_records(RecordFilter::default()).unwrap();
        assert_eq!(all.iter().map(|r| r.tx_id).collect::<Vec<_>>(), ids);

        let signed = store.list_records(RecordFilter::with_status(TxStatus::Signed)).unwrap();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].tx_id, ids[1]);
    });
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("transactions.json");
    let account = test_address(0xA0);
    let metadata = MetadataBuilder::default().build();
    let id = tx_id_for(account, &metadata);

    {
        let store = FileTransactionStore::new(&path);
        store.create_record(id, account, TEST_CHAIN_ID, metadata, test_address(0x01)).expect("create");
        store.add_signature(&id, signature(test_address(0xAA), b"s1", 1)).expect("sign");
    }

    let reopened = FileTransactionStore::new(&path);
    let record = reopened.get_record(&id).expect("get").expect("present");
    assert_eq!(record.signer_count(), 1);
    assert_eq!(record.status, TxStatus::Pending);
    // The atomic rewrite leaves no temp file behind.
    assert!(!path.with_extension("tmp").exists());
}
