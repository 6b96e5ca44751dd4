//! Password-based key derivation using scrypt.
//!
//! scrypt is a memory-hard KDF, so every guess at a vault password costs
//! the attacker `128 * r * 2^log_n` bytes of memory.  Parameters are
//! configurable via `KdfParams` (loaded from `config.toml` or defaults).

use rand::RngCore;
use scrypt::Params;

use crate::errors::{CredVaultError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Smallest accepted `log_n` (1 MB of memory with `r = 8`).
const MIN_LOG_N: u8 = 10;

/// Configurable scrypt parameters.
///
/// The parameters are not recorded inside a ciphertext blob, so a blob
/// can only be opened with the parameters it was sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Base-2 logarithm of the CPU/memory cost `N` (default: 14).
    pub log_n: u8,
    /// Block size (default: 8).
    pub r: u32,
    /// Parallelization (default: 1).
    pub p: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            log_n: 14,
            r: 8,
            p: 1,
        }
    }
}

impl KdfParams {
    /// Check the parameters without deriving anything.
    ///
    /// Enforces a floor on the cost so a config file cannot silently
    /// turn the KDF into a fast hash.
    pub fn validate(&self) -> Result<()> {
        if self.log_n < MIN_LOG_N {
            return Err(CredVaultError::KeyDerivationFailed(format!(
                "scrypt log_n must be at least {MIN_LOG_N} (got {})",
                self.log_n
            )));
        }
        if self.r < 1 {
            return Err(CredVaultError::KeyDerivationFailed(
                "scrypt r must be at least 1".into(),
            ));
        }
        if self.p < 1 {
            return Err(CredVaultError::KeyDerivationFailed(
                "scrypt p must be at least 1".into(),
            ));
        }
        self.to_scrypt().map(|_| ())
    }

    fn to_scrypt(self) -> Result<Params> {
        Params::new(self.log_n, self.r, self.p, KEY_LEN)
            .map_err(|e| CredVaultError::KeyDerivationFailed(format!("invalid scrypt params: {e}")))
    }
}

/// Derive a 32-byte key from a password and salt.
///
/// The same password + salt + params will always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<[u8; KEY_LEN]> {
    params.validate()?;
    let scrypt_params = params.to_scrypt()?;
    tracing::trace!(log_n = params.log_n, r = params.r, p = params.p, "deriving key");

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password, salt, &scrypt_params, &mut key)
        .map_err(|e| CredVaultError::KeyDerivationFailed(format!("scrypt failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
