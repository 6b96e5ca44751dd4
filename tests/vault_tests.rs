//! Integration tests for the single-vault state machine.

use credvault::crypto::{Codec, KdfParams};
use credvault::errors::{CredVaultError, ErrorKind};
use credvault::vault::{Credential, LockOutcome, UnlockOutcome, Vault, VaultRecord};

/// Helper: a codec with cheap scrypt parameters.
fn codec() -> Codec {
    Codec::new(KdfParams {
        log_n: 10,
        r: 8,
        p: 1,
    })
    .expect("fast params are valid")
}

/// Helper: a fresh unlocked vault named "teamsecrets".
fn new_vault(codec: &Codec) -> Vault {
    Vault::create(codec, "teamsecrets", "pass1").expect("create vault")
}

fn keys(vault: &Vault) -> Vec<String> {
    vault
        .credentials()
        .unwrap()
        .iter()
        .map(|c| c.key.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[test]
fn create_starts_unlocked_and_empty() {
    let codec = codec();
    let vault = new_vault(&codec);

    assert_eq!(vault.name(), "teamsecrets");
    assert!(vault.is_unlocked());
    assert!(vault.credentials().unwrap().is_empty());

    // The ciphertext is already consistent with the empty set.
    let sealed: Vec<Credential> = codec.decrypt(vault.ciphertext(), "pass1").unwrap();
    assert!(sealed.is_empty());
}

#[test]
fn create_rejects_bad_names_and_passwords() {
    let codec = codec();

    for name in ["", "four", "team secrets", "team\tsecrets"] {
        let err = Vault::create(&codec, name, "pass1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "name {name:?}");
    }

    let err = Vault::create(&codec, "teamsecrets", "pass").unwrap_err();
    assert!(matches!(err, CredVaultError::InvalidPassword(_)));
}

// ---------------------------------------------------------------------------
// Lock / unlock
// ---------------------------------------------------------------------------

#[test]
fn lock_hides_credentials_and_unlock_restores_them() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault
        .add_credential(&codec, Credential::new("api", "xyz"))
        .unwrap();

    assert_eq!(vault.lock(&codec, "teamsecrets").unwrap(), LockOutcome::Locked);
    assert!(!vault.is_unlocked());
    let err = vault.credentials().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    assert_eq!(
        vault.unlock(&codec, "teamsecrets", "pass1").unwrap(),
        UnlockOutcome::Unlocked
    );
    assert_eq!(vault.credentials().unwrap(), &[Credential::new("api", "xyz")]);
}

#[test]
fn unlock_is_idempotent() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault
        .add_credential(&codec, Credential::new("api", "xyz"))
        .unwrap();
    let ciphertext_before = vault.ciphertext().to_string();

    // Even a wrong password is not checked when already unlocked.
    let outcome = vault.unlock(&codec, "teamsecrets", "whatever").unwrap();
    assert_eq!(outcome, UnlockOutcome::AlreadyUnlocked);
    assert_eq!(keys(&vault), vec!["api"]);
    assert_eq!(vault.ciphertext(), ciphertext_before);
}

#[test]
fn lock_is_idempotent() {
    let codec = codec();
    let mut vault = new_vault(&codec);

    assert_eq!(vault.lock(&codec, "teamsecrets").unwrap(), LockOutcome::Locked);
    let ciphertext = vault.ciphertext().to_string();

    assert_eq!(
        vault.lock(&codec, "teamsecrets").unwrap(),
        LockOutcome::AlreadyLocked
    );
    assert_eq!(vault.ciphertext(), ciphertext);
}

#[test]
fn wrong_password_leaves_vault_locked() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault.lock(&codec, "teamsecrets").unwrap();

    let err = vault.unlock(&codec, "teamsecrets", "wrong1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(!vault.is_unlocked());
}

#[test]
fn name_mismatch_is_rejected() {
    let codec = codec();
    let mut vault = new_vault(&codec);

    let err = vault.lock(&codec, "othervault").unwrap_err();
    assert!(matches!(err, CredVaultError::VaultNameMismatch { .. }));
    assert!(vault.is_unlocked());

    vault.lock(&codec, "teamsecrets").unwrap();
    let err = vault.unlock(&codec, "othervault", "pass1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!vault.is_unlocked());
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[test]
fn add_credential_writes_through_to_ciphertext() {
    let codec = codec();
    let mut vault = new_vault(&codec);

    vault
        .add_credential(&codec, Credential::new("api", "xyz"))
        .unwrap();
    vault
        .add_credential(&codec, Credential::new("db", "postgres://"))
        .unwrap();

    let sealed: Vec<Credential> = codec.decrypt(vault.ciphertext(), "pass1").unwrap();
    assert_eq!(sealed, vault.credentials().unwrap());
    assert_eq!(keys(&vault), vec!["api", "db"]);
}

#[test]
fn duplicate_key_is_rejected_and_original_kept() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault
        .add_credential(&codec, Credential::new("api", "xyz"))
        .unwrap();

    let err = vault
        .add_credential(&codec, Credential::new("api", "other"))
        .unwrap_err();
    assert!(matches!(err, CredVaultError::CredentialAlreadyExists(ref k) if k == "api"));
    assert_eq!(vault.credentials().unwrap(), &[Credential::new("api", "xyz")]);
}

#[test]
fn keys_are_case_sensitive() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault.add_credential(&codec, Credential::new("api", "1")).unwrap();
    vault.add_credential(&codec, Credential::new("API", "2")).unwrap();

    assert_eq!(keys(&vault), vec!["api", "API"]);
}

#[test]
fn empty_credential_fields_are_rejected() {
    let codec = codec();
    let mut vault = new_vault(&codec);

    let err = vault
        .add_credential(&codec, Credential::new("", "xyz"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = vault
        .add_credential(&codec, Credential::new("api", ""))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(vault.credentials().unwrap().is_empty());
}

#[test]
fn mutations_require_unlocked_vault() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault.lock(&codec, "teamsecrets").unwrap();

    let err = vault
        .add_credential(&codec, Credential::new("api", "xyz"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    let err = vault.delete_credential(&codec, "api").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn delete_credential_removes_and_reseals() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault.add_credential(&codec, Credential::new("a-key", "1")).unwrap();
    vault.add_credential(&codec, Credential::new("b-key", "2")).unwrap();
    vault.add_credential(&codec, Credential::new("c-key", "3")).unwrap();

    vault.delete_credential(&codec, "b-key").unwrap();
    assert_eq!(keys(&vault), vec!["a-key", "c-key"]);

    vault.lock(&codec, "teamsecrets").unwrap();
    vault.unlock(&codec, "teamsecrets", "pass1").unwrap();
    assert_eq!(keys(&vault), vec!["a-key", "c-key"]);
}

#[test]
fn delete_missing_credential_changes_nothing() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault.add_credential(&codec, Credential::new("api", "xyz")).unwrap();
    let ciphertext = vault.ciphertext().to_string();

    let err = vault.delete_credential(&codec, "nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(keys(&vault), vec!["api"]);
    assert_eq!(vault.ciphertext(), ciphertext);
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[test]
fn record_of_locked_vault_has_no_plaintext() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault.add_credential(&codec, Credential::new("api", "xyz")).unwrap();
    vault.lock(&codec, "teamsecrets").unwrap();

    let record = vault.to_record();
    assert!(!record.is_unlocked);
    assert!(record.credentials.is_none());
    assert_eq!(record.ciphertext, vault.ciphertext());
}

#[test]
fn restored_snapshot_is_readable_but_needs_password_to_change() {
    let codec = codec();
    let mut original = new_vault(&codec);
    original.add_credential(&codec, Credential::new("api", "xyz")).unwrap();

    let mut restored = Vault::from_record(original.to_record());
    assert!(restored.is_unlocked());
    assert!(!restored.has_session_password());
    assert_eq!(restored.credentials().unwrap(), &[Credential::new("api", "xyz")]);

    let err = restored
        .add_credential(&codec, Credential::new("db", "x"))
        .unwrap_err();
    assert!(matches!(err, CredVaultError::PasswordRequired(_)));
    assert_eq!(err.kind(), ErrorKind::State);

    // Locking keeps the existing ciphertext, which still opens.
    restored.lock(&codec, "teamsecrets").unwrap();
    restored.unlock(&codec, "teamsecrets", "pass1").unwrap();
    assert_eq!(restored.credentials().unwrap(), &[Credential::new("api", "xyz")]);
}

#[test]
fn unlocked_record_without_snapshot_loads_locked() {
    let codec = codec();
    let vault = new_vault(&codec);

    let record = VaultRecord {
        credentials: None,
        ..vault.to_record()
    };
    assert!(record.is_unlocked);

    let restored = Vault::from_record(record);
    assert!(!restored.is_unlocked());
}

#[test]
fn verify_password_does_not_change_state() {
    let codec = codec();
    let mut vault = new_vault(&codec);
    vault.lock(&codec, "teamsecrets").unwrap();

    vault.verify_password(&codec, "pass1").unwrap();
    assert!(!vault.is_unlocked());

    let err = vault.verify_password(&codec, "wrong1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[test]
fn unlock_rejects_ciphertext_with_duplicate_keys() {
    let codec = codec();
    let duplicated = vec![Credential::new("api", "a"), Credential::new("api", "b")];
    let mut vault = Vault::from_record(VaultRecord {
        name: "teamsecrets".into(),
        ciphertext: codec.encrypt(&duplicated, "pass1").unwrap(),
        is_unlocked: false,
        credentials: None,
    });

    let err = vault.unlock(&codec, "teamsecrets", "pass1").unwrap_err();
    assert!(matches!(err, CredVaultError::InvalidCredential(_)));
    assert!(!vault.is_unlocked());
}

#[test]
fn snapshot_with_duplicate_keys_loads_locked() {
    let codec = codec();
    let mut vault = Vault::from_record(VaultRecord {
        name: "teamsecrets".into(),
        ciphertext: codec.encrypt(&[Credential::new("api", "a")], "pass1").unwrap(),
        is_unlocked: true,
        credentials: Some(vec![Credential::new("api", "a"), Credential::new("api", "b")]),
    });
    assert!(!vault.is_unlocked());

    // The ciphertext is still the source of truth.
    vault.unlock(&codec, "teamsecrets", "pass1").unwrap();
    assert_eq!(vault.credentials().unwrap(), &[Credential::new("api", "a")]);
}
