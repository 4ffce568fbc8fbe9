use crate::fixtures::{address_of_secret, fast_kdf, test_address, TEST_PASSWORD, TEST_SECRET_A, TEST_SECRET_B};
use conclave_core::domain::IdentityKind;
use conclave_core::foundation::ConclaveError;
use conclave_core::infrastructure::vault::Vault;

fn vault() -> (tempfile::TempDir, Vault) {
    let dir = tempfile::tempdir().expect("tempdir");
    let vault = Vault::new(dir.path()).with_kdf_params(fast_kdf());
    (dir, vault)
}

#[test]
fn import_then_reveal_roundtrip() {
    let (_dir, vault) = vault();
    let identity = vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    assert_eq!(identity.kind, IdentityKind::LocalSecret);
    assert_eq!(identity.address, address_of_secret(&TEST_SECRET_A));

    let secret = vault.reveal_secret(&identity.id, TEST_PASSWORD).expect("reveal");
    assert_eq!(secret.expose_secret(), &TEST_SECRET_A);
}

#[test]
fn wrong_password_fails_closed() {
    let (_dir, vault) = vault();
    let identity = vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let err = vault.reveal_secret(&identity.id, "nope").unwrap_err();
    assert!(matches!(err, ConclaveError::WrongPassword));
}

#[test]
fn duplicate_address_rejected() {
    let (_dir, vault) = vault();
    vault.import_local_secret("ops", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let err = vault.import_local_secret("ops-again", &TEST_SECRET_A, TEST_PASSWORD).unwrap_err();
    assert!(matches!(err, ConclaveError::DuplicateIdentity { .. }));

    // Same rule for external identities.
    let err = vault
        .import_external_identity("hw", address_of_secret(&TEST_SECRET_A), None)
        .unwrap_err();
    assert!(matches!(err, ConclaveError::DuplicateIdentity { .. }));
}

#[test]
fn external_identity_has_no_secret_to_reveal() {
    let (_dir, vault) = vault();
    let identity = vault
        .import_external_identity("hw", test_address(0xE0), Some("m/44'/60'/0'/0/0".to_string()))
        .expect("import");
    let err = vault.reveal_secret(&identity.id, TEST_PASSWORD).unwrap_err();
    assert!(matches!(err, ConclaveError::UnsupportedIdentityKind { .. }));
}

#[test]
fn first_identity_becomes_active() {
    let (_dir, vault) = vault();
    assert!(vault.active().expect("active").is_none());

    let first = vault.import_local_secret("first", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    assert_eq!(vault.active().unwrap().unwrap().id, first.id);

    // A later import does not steal "active".
    let second = vault.import_local_secret("second", &TEST_SECRET_B, TEST_PASSWORD).expect("import");
    assert_eq!(vault.active().unwrap().unwrap().id, first.id);

    vault.set_active(&second.id).expect("set active");
    assert_eq!(vault.active().unwrap().unwrap().id, second.id);
}

#[test]
fn removing_active_identity_reassigns_deterministically() {
    let (_dir, vault) = vault();
    let first = vault.import_local_secret("first", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    let second = vault.import_local_secret("second", &TEST_SECRET_B, TEST_PASSWORD).expect("import");

    vault.remove(&first.id).expect("remove active");
    assert_eq!(vault.active().unwrap().unwrap().id, second.id);

    // The removed identity's secret is gone with it.
    let err = vault.reveal_secret(&first.id, TEST_PASSWORD).unwrap_err();
    assert!(matches!(err, ConclaveError::IdentityNotFound(_)));

    vault.remove(&second.id).expect("remove last");
    assert!(vault.active().unwrap().is_none());
}

#[test]
fn rename_and_touch_are_the_only_mutations() {
    let (_dir, vault) = vault();
    let identity = vault.import_local_secret("old-name", &TEST_SECRET_A, TEST_PASSWORD).expect("import");
    vault.rename(&identity.id, "new-name").expect("rename");
    vault.touch_last_used(&identity.id).expect("touch");

    let reloaded = vault.get(&identity.id).expect("get");
    assert_eq!(reloaded.name, "new-name");
    assert!(reloaded.last_used_millis.is_some());
    assert_eq!(reloaded.address, identity.address);
}

#[test]
fn unknown_identity_errors() {
    let (_dir, vault) = vault();
    let id = conclave_core::foundation::IdentityId::from("0xmissing");
    assert!(matches!(vault.get(&id), Err(ConclaveError::IdentityNotFound(_))));
    assert!(matches!(vault.set_active(&id), Err(ConclaveError::IdentityNotFound(_))));
    assert!(matches!(vault.remove(&id), Err(ConclaveError::IdentityNotFound(_))));
}
