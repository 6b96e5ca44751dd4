//! A single vault and its lock/unlock state machine.
//!
//! A `Vault` always carries the ciphertext of its last committed
//! credential set.  Plaintext credentials only exist inside the
//! `Unlocked` state, so a locked vault has nothing to leak.
//!
//! Every successful mutation re-seals the credentials before it is
//! committed: the ciphertext and the live plaintext never disagree.

use std::collections::HashSet;
use std::fmt;

use zeroize::Zeroizing;

use super::credential::Credential;
use super::record::VaultRecord;
use crate::crypto::Codec;
use crate::errors::{CredVaultError, Result};

/// Minimum length of a vault name, in characters.
pub const MIN_NAME_LEN: usize = 5;

/// Minimum length of a vault password, in characters.
pub const MIN_PASSWORD_LEN: usize = 5;

/// Result of a successful `unlock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    /// The vault was already unlocked; nothing was re-derived.
    AlreadyUnlocked,
}

/// Result of a successful `lock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    Locked,
    /// The vault was already locked; nothing changed.
    AlreadyLocked,
}

#[derive(Clone)]
enum LockState {
    Locked,
    Unlocked(Session),
}

/// Plaintext held while a vault is unlocked.
#[derive(Clone)]
struct Session {
    credentials: Vec<Credential>,
    /// The password the vault was opened with.  `None` when the vault
    /// was restored unlocked from a record snapshot.
    password: Option<Zeroizing<String>>,
}

/// A named, password-protected container of credentials.
#[derive(Clone)]
pub struct Vault {
    name: String,
    ciphertext: String,
    state: LockState,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new, empty vault.
    ///
    /// Validates the name and password, seals an empty credential list
    /// and returns the vault already unlocked.
    pub fn create(codec: &Codec, name: &str, password: &str) -> Result<Self> {
        validate_vault_name(name)?;
        validate_password(password)?;

        let credentials = Vec::new();
        let ciphertext = codec.encrypt(&credentials, password)?;

        Ok(Self {
            name: name.to_string(),
            ciphertext,
            state: LockState::Unlocked(Session {
                credentials,
                password: Some(Zeroizing::new(password.to_string())),
            }),
        })
    }

    /// Rebuild a vault from its persisted record.
    ///
    /// No password is known at rest.  The vault comes back unlocked only
    /// if the record carries a plaintext snapshot.
    pub fn from_record(record: VaultRecord) -> Self {
        let state = match (record.is_unlocked, record.credentials) {
            (true, Some(credentials)) => match check_credential_set(&credentials) {
                Ok(()) => LockState::Unlocked(Session {
                    credentials,
                    password: None,
                }),
                Err(e) => {
                    tracing::warn!(
                        vault = %record.name,
                        error = %e,
                        "record snapshot is not a valid credential set, loading locked"
                    );
                    LockState::Locked
                }
            },
            (true, None) => {
                tracing::warn!(
                    vault = %record.name,
                    "record marked unlocked without a credential snapshot, loading locked"
                );
                LockState::Locked
            }
            (false, _) => LockState::Locked,
        };

        Self {
            name: record.name,
            ciphertext: record.ciphertext,
            state,
        }
    }

    /// Build an unlocked vault from an already-verified credential set.
    ///
    /// Used by the share codec once the token's ciphertext has been opened.
    pub(crate) fn from_verified(
        name: String,
        ciphertext: String,
        credentials: Vec<Credential>,
        password: Zeroizing<String>,
    ) -> Self {
        Self {
            name,
            ciphertext,
            state: LockState::Unlocked(Session {
                credentials,
                password: Some(password),
            }),
        }
    }

    /// Serialize the current state for the record file.
    pub fn to_record(&self) -> VaultRecord {
        let credentials = match &self.state {
            LockState::Unlocked(session) => Some(session.credentials.clone()),
            LockState::Locked => None,
        };
        VaultRecord {
            name: self.name.clone(),
            ciphertext: self.ciphertext.clone(),
            is_unlocked: credentials.is_some(),
            credentials,
        }
    }

    // ------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------

    /// Decrypt the vault with `password`.
    ///
    /// Idempotent: an unlocked vault reports `AlreadyUnlocked` without
    /// touching the KDF.  A wrong password leaves the vault locked.
    pub fn unlock(&mut self, codec: &Codec, name: &str, password: &str) -> Result<UnlockOutcome> {
        self.check_name(name)?;

        if self.is_unlocked() {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let credentials: Vec<Credential> = codec.decrypt(&self.ciphertext, password)?;
        check_credential_set(&credentials)?;
        self.state = LockState::Unlocked(Session {
            credentials,
            password: Some(Zeroizing::new(password.to_string())),
        });
        Ok(UnlockOutcome::Unlocked)
    }

    /// Re-seal the credentials and drop the plaintext.
    ///
    /// Without a session password (vault restored from a snapshot) the
    /// existing ciphertext is kept: write-through guarantees it already
    /// matches the plaintext.
    pub fn lock(&mut self, codec: &Codec, name: &str) -> Result<LockOutcome> {
        self.check_name(name)?;

        let session = match &self.state {
            LockState::Locked => return Ok(LockOutcome::AlreadyLocked),
            LockState::Unlocked(session) => session,
        };

        if let Some(password) = &session.password {
            self.ciphertext = codec.encrypt(&session.credentials, password)?;
        }
        self.state = LockState::Locked;
        Ok(LockOutcome::Locked)
    }

    /// Check `password` against the ciphertext without changing state.
    pub fn verify_password(&self, codec: &Codec, password: &str) -> Result<()> {
        codec
            .decrypt::<Vec<Credential>>(&self.ciphertext, password)
            .map(|_| ())
    }

    /// Attach a verified password to an unlocked vault that lacks one.
    ///
    /// The credentials are replaced with the decrypted ciphertext, which
    /// by write-through equals the snapshot.  No-op if the session
    /// already holds a password.
    pub(crate) fn authorize(&mut self, codec: &Codec, password: &str) -> Result<()> {
        let name = self.name.clone();
        let session = self.session_mut()?;
        if session.password.is_some() {
            return Ok(());
        }

        let credentials: Vec<Credential> = codec.decrypt(&self.ciphertext, password)?;
        check_credential_set(&credentials)?;
        self.state = LockState::Unlocked(Session {
            credentials,
            password: Some(Zeroizing::new(password.to_string())),
        });
        tracing::debug!(vault = %name, "attached password to restored session");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Credential operations
    // ------------------------------------------------------------------

    /// Append a credential and re-seal.
    pub fn add_credential(&mut self, codec: &Codec, credential: Credential) -> Result<()> {
        credential.validate()?;

        let session = self.session_ref()?;
        if session.credentials.iter().any(|c| c.key == credential.key) {
            return Err(CredVaultError::CredentialAlreadyExists(credential.key.clone()));
        }

        let mut updated = session.credentials.clone();
        updated.push(credential);
        self.commit(codec, updated)
    }

    /// The current credentials, in insertion order.
    pub fn credentials(&self) -> Result<&[Credential]> {
        Ok(&self.session_ref()?.credentials)
    }

    /// Remove the credential with `key` and re-seal.
    pub fn delete_credential(&mut self, codec: &Codec, key: &str) -> Result<()> {
        let session = self.session_ref()?;
        let position = session
            .credentials
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| CredVaultError::CredentialNotFound(key.to_string()))?;

        let mut updated = session.credentials.clone();
        updated.remove(position);
        self.commit(codec, updated)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sealed form of the last committed credential set.
    pub fn ciphertext(&self) -> &str {
        &self.ciphertext
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, LockState::Unlocked(_))
    }

    /// `true` if the vault is unlocked and can be mutated without
    /// asking for its password.
    pub fn has_session_password(&self) -> bool {
        matches!(
            &self.state,
            LockState::Unlocked(Session {
                password: Some(_),
                ..
            })
        )
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_name(&self, name: &str) -> Result<()> {
        if name != self.name {
            return Err(CredVaultError::VaultNameMismatch {
                expected: self.name.clone(),
                given: name.to_string(),
            });
        }
        Ok(())
    }

    fn session_ref(&self) -> Result<&Session> {
        match &self.state {
            LockState::Unlocked(session) => Ok(session),
            LockState::Locked => Err(CredVaultError::VaultLocked(self.name.clone())),
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        match &mut self.state {
            LockState::Unlocked(session) => Ok(session),
            LockState::Locked => Err(CredVaultError::VaultLocked(self.name.clone())),
        }
    }

    /// Seal `credentials` and, only if that succeeded, make them current.
    fn commit(&mut self, codec: &Codec, credentials: Vec<Credential>) -> Result<()> {
        let name = self.name.clone();
        let session = self.session_mut()?;
        let password = session
            .password
            .as_ref()
            .ok_or(CredVaultError::PasswordRequired(name))?;

        let ciphertext = codec.encrypt(&credentials, password)?;
        session.credentials = credentials;
        self.ciphertext = ciphertext;
        Ok(())
    }
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("name", &self.name)
            .field("unlocked", &self.is_unlocked())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a vault name is usable.
///
/// At least five characters, no whitespace anywhere.
pub fn validate_vault_name(name: &str) -> Result<()> {
    if name.chars().count() < MIN_NAME_LEN {
        return Err(CredVaultError::InvalidVaultName(format!(
            "vault name must be at least {MIN_NAME_LEN} characters long"
        )));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(CredVaultError::InvalidVaultName(format!(
            "vault name '{name}' cannot contain spaces"
        )));
    }
    Ok(())
}

/// Validate the shape of a vault password (at least five characters).
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredVaultError::InvalidPassword(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Check a credential set that did not come from `add_credential`:
/// every entry must be valid and no key may appear twice.
pub(crate) fn check_credential_set(credentials: &[Credential]) -> Result<()> {
    let mut seen = HashSet::with_capacity(credentials.len());
    for credential in credentials {
        credential.validate()?;
        if !seen.insert(credential.key.as_str()) {
            return Err(CredVaultError::InvalidCredential(format!(
                "credential '{}' appears more than once",
                credential.key
            )));
        }
    }
    Ok(())
}
