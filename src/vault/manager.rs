//! High-level vault operations used by CLI commands.
//!
//! `VaultManager` owns every vault of one record file.  It enforces
//! name uniqueness, validates passwords before any KDF work, and
//! rewrites the whole record file after every successful mutation.
//!
//! Mutations are staged on a copy of the affected vault.  The record
//! file is written with the staged state first and the copy only
//! replaces the in-memory vault once that write succeeded, so a failed
//! write leaves both memory and disk as they were.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use super::credential::Credential;
use super::entity::{validate_password, validate_vault_name, LockOutcome, UnlockOutcome, Vault};
use super::record::{self, RecordFile};
use super::share;
use crate::config::{RelockPolicy, Settings};
use crate::crypto::{Codec, KdfParams};
use crate::errors::{CredVaultError, Result};

/// Name and lock state of one vault, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSummary {
    pub name: String,
    pub unlocked: bool,
}

/// A staged change to the collection.
enum Change<'a> {
    Put(Vault),
    Remove(&'a str),
}

/// The collection of vaults behind one record file.
///
/// Assumes it is the only writer of that file.
#[derive(Debug)]
pub struct VaultManager {
    /// Path to the record file on disk.
    path: PathBuf,

    codec: Codec,

    relock: RelockPolicy,

    /// Vault name -> vault.
    vaults: BTreeMap<String, Vault>,
}

impl VaultManager {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Load the record file at `path` (an absent file means no vaults).
    ///
    /// Vaults come back locked unless their record carries an unlocked
    /// snapshot.  No password is checked here.  A key that is not a valid
    /// vault name makes the whole file invalid.
    pub fn open(path: &Path, kdf: &KdfParams, relock: RelockPolicy) -> Result<Self> {
        let codec = Codec::new(*kdf)?;
        let records = record::read_records(path)?;

        let mut vaults = BTreeMap::new();
        for (name, mut rec) in records {
            validate_vault_name(&name).map_err(|e| CredVaultError::InvalidRecordFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            if rec.name != name {
                tracing::warn!(key = %name, record = %rec.name, "record name differs from its key, using the key");
                rec.name = name.clone();
            }
            vaults.insert(name, Vault::from_record(rec));
        }

        Ok(Self {
            path: path.to_path_buf(),
            codec,
            relock,
            vaults,
        })
    }

    /// Open the record file named by `settings` with its KDF and
    /// re-lock configuration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let path = settings.vault_file()?;
        Self::open(&path, &settings.kdf_params(), settings.relock_policy)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns the path to the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn relock_policy(&self) -> RelockPolicy {
        self.relock
    }

    /// All vaults, sorted by name.
    pub fn list_vaults(&self) -> Vec<VaultSummary> {
        self.vaults
            .values()
            .map(|v| VaultSummary {
                name: v.name().to_string(),
                unlocked: v.is_unlocked(),
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vaults.contains_key(name)
    }

    pub fn is_unlocked(&self, name: &str) -> Result<bool> {
        Ok(self.vault(name)?.is_unlocked())
    }

    /// Read-only access to a vault.
    pub fn vault(&self, name: &str) -> Result<&Vault> {
        self.vaults
            .get(name)
            .ok_or_else(|| CredVaultError::VaultNotFound(name.to_string()))
    }

    // ------------------------------------------------------------------
    // Vault lifecycle
    // ------------------------------------------------------------------

    /// Create a new, unlocked vault and persist it.
    pub fn create_vault(&mut self, name: &str, password: &str) -> Result<()> {
        validate_vault_name(name)?;
        validate_password(password)?;
        if self.vaults.contains_key(name) {
            return Err(CredVaultError::VaultAlreadyExists(name.to_string()));
        }

        let vault = Vault::create(&self.codec, name, password)?;
        self.commit(Change::Put(vault))?;

        tracing::info!(vault = %name, "created vault");
        Ok(())
    }

    /// Lock a vault.  Locking a locked vault is not an error.
    pub fn lock_vault(&mut self, name: &str) -> Result<LockOutcome> {
        let mut vault = self.working_copy(name)?;
        let outcome = vault.lock(&self.codec, name)?;

        if outcome == LockOutcome::Locked {
            self.commit(Change::Put(vault))?;
            tracing::info!(vault = %name, "locked vault");
        }
        Ok(outcome)
    }

    /// Unlock a vault.  Unlocking an unlocked vault is not an error.
    pub fn unlock_vault(&mut self, name: &str, password: &str) -> Result<UnlockOutcome> {
        validate_password(password)?;
        let mut vault = self.working_copy(name)?;
        let outcome = vault.unlock(&self.codec, name, password)?;

        if outcome == UnlockOutcome::Unlocked {
            self.commit(Change::Put(vault))?;
            tracing::info!(vault = %name, "unlocked vault");
        }
        Ok(outcome)
    }

    /// Delete a vault.
    ///
    /// Without `force` the password must open the vault's ciphertext,
    /// even if the vault is currently unlocked.  `force` skips that check
    /// and is meant for administrative recovery only.
    pub fn delete_vault(&mut self, name: &str, password: Option<&str>, force: bool) -> Result<()> {
        let vault = self.vault(name)?;

        if force {
            tracing::warn!(vault = %name, "force-deleting vault without password check");
        } else {
            let password = password.ok_or_else(|| {
                CredVaultError::InvalidPassword("a password is required to delete a vault".into())
            })?;
            validate_password(password)?;
            vault.verify_password(&self.codec, password)?;
        }

        self.commit(Change::Remove(name))?;
        tracing::info!(vault = %name, "deleted vault");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Credential operations
    // ------------------------------------------------------------------

    /// Add a credential, unlocking the vault with `password` if needed.
    pub fn add_credential(
        &mut self,
        vault_name: &str,
        password: Option<&str>,
        credential: Credential,
    ) -> Result<()> {
        let (mut vault, implicit) = self.access(vault_name, password, true)?;
        vault.add_credential(&self.codec, credential)?;
        self.settle(&mut vault, implicit)?;
        self.commit(Change::Put(vault))?;

        tracing::debug!(vault = %vault_name, "added credential");
        Ok(())
    }

    /// Return the vault's credentials, unlocking it with `password` if
    /// needed.
    pub fn get_credentials(
        &mut self,
        vault_name: &str,
        password: Option<&str>,
    ) -> Result<Vec<Credential>> {
        let (vault, implicit) = self.access(vault_name, password, false)?;
        let credentials = vault.credentials()?.to_vec();
        self.finish_read(vault, implicit)?;
        Ok(credentials)
    }

    /// Remove a credential, unlocking the vault with `password` if needed.
    pub fn delete_credential(
        &mut self,
        vault_name: &str,
        password: Option<&str>,
        key: &str,
    ) -> Result<()> {
        let (mut vault, implicit) = self.access(vault_name, password, true)?;
        vault.delete_credential(&self.codec, key)?;
        self.settle(&mut vault, implicit)?;
        self.commit(Change::Put(vault))?;

        tracing::debug!(vault = %vault_name, "deleted credential");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sharing
    // ------------------------------------------------------------------

    /// Produce a transfer token for a vault, unlocking it with
    /// `password` if needed.
    pub fn share_vault(&mut self, vault_name: &str, password: Option<&str>) -> Result<String> {
        let (vault, implicit) = self.access(vault_name, password, false)?;
        let token = share::generate_share_id(&self.codec, &vault)?;
        self.finish_read(vault, implicit)?;
        Ok(token)
    }

    /// Import a vault from a transfer token.
    ///
    /// The received credentials are re-sealed under `password`, chosen by
    /// the recipient, and the vault is stored unlocked.  Returns the name
    /// of the new vault.
    pub fn receive_vault(&mut self, token: &str, password: &str) -> Result<String> {
        validate_password(password)?;

        let received = share::receive_vault(&self.codec, token)?;
        let name = received.name().to_string();
        if self.vaults.contains_key(&name) {
            return Err(CredVaultError::VaultAlreadyExists(name));
        }

        let credentials = received.credentials()?.to_vec();
        let ciphertext = self.codec.encrypt(&credentials, password)?;
        let vault = Vault::from_verified(
            name.clone(),
            ciphertext,
            credentials,
            Zeroizing::new(password.to_string()),
        );
        self.commit(Change::Put(vault))?;

        tracing::info!(vault = %name, "received shared vault");
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Rewrite the record file from the current in-memory state.
    pub fn save(&self) -> Result<()> {
        record::write_records(&self.path, &self.records())
    }

    fn records(&self) -> RecordFile {
        self.vaults
            .iter()
            .map(|(name, vault)| (name.clone(), vault.to_record()))
            .collect()
    }

    /// Persist the collection with `change` applied, then apply it in
    /// memory.
    fn commit(&mut self, change: Change<'_>) -> Result<()> {
        let mut records = self.records();
        match &change {
            Change::Put(vault) => {
                records.insert(vault.name().to_string(), vault.to_record());
            }
            Change::Remove(name) => {
                records.remove(*name);
            }
        }

        record::write_records(&self.path, &records)?;

        match change {
            Change::Put(vault) => {
                self.vaults.insert(vault.name().to_string(), vault);
            }
            Change::Remove(name) => {
                self.vaults.remove(name);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn working_copy(&self, name: &str) -> Result<Vault> {
        self.vault(name).cloned()
    }

    /// Stage a copy of `name` that is ready for the requested access.
    ///
    /// Returns the copy and whether this call had to unlock it.  A vault
    /// restored unlocked from disk has no password in memory, so write
    /// access needs `password` to be supplied and verified.
    fn access(&self, name: &str, password: Option<&str>, write: bool) -> Result<(Vault, bool)> {
        let mut vault = self.working_copy(name)?;

        if vault.is_unlocked() {
            if write && !vault.has_session_password() {
                let password =
                    password.ok_or_else(|| CredVaultError::PasswordRequired(name.to_string()))?;
                validate_password(password)?;
                vault.authorize(&self.codec, password)?;
            }
            return Ok((vault, false));
        }

        let password = password.ok_or_else(|| CredVaultError::VaultLocked(name.to_string()))?;
        validate_password(password)?;
        vault.unlock(&self.codec, name, password)?;
        Ok((vault, true))
    }

    /// Apply the re-lock policy to a vault this call unlocked.
    fn settle(&self, vault: &mut Vault, implicit: bool) -> Result<()> {
        if implicit && self.relock == RelockPolicy::Relock {
            let name = vault.name().to_string();
            vault.lock(&self.codec, &name)?;
        }
        Ok(())
    }

    /// Finish a read-only access.
    ///
    /// Only an implicit unlock that stays unlocked changes anything worth
    /// persisting; under `Relock` the staged copy is simply dropped.
    fn finish_read(&mut self, vault: Vault, implicit: bool) -> Result<()> {
        if implicit && self.relock == RelockPolicy::KeepUnlocked {
            self.commit(Change::Put(vault))?;
        }
        Ok(())
    }
}
