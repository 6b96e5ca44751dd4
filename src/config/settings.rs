use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::KdfParams;
use crate::errors::{CredVaultError, Result};

/// Directory name used under the platform config dir.
const APP_DIR: &str = "credvault";

/// What a manager call does after it had to unlock a vault implicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelockPolicy {
    /// Leave the vault unlocked (and its snapshot in the record file).
    #[default]
    KeepUnlocked,
    /// Lock the vault again before the call returns.
    Relock,
}

/// Installation-level configuration, loaded from `config.toml`.
///
/// Every field has a sensible default so CredVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Record file holding every vault (default: `<config dir>/credvault/vaults.json`).
    #[serde(default)]
    pub vault_file: Option<PathBuf>,

    /// Re-lock behaviour after an implicit unlock.
    #[serde(default)]
    pub relock_policy: RelockPolicy,

    /// scrypt cost exponent (default: 14, i.e. N = 16384).
    #[serde(default = "default_scrypt_log_n")]
    pub scrypt_log_n: u8,

    /// scrypt block size (default: 8).
    #[serde(default = "default_scrypt_r")]
    pub scrypt_r: u32,

    /// scrypt parallelism (default: 1).
    #[serde(default = "default_scrypt_p")]
    pub scrypt_p: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_scrypt_log_n() -> u8 {
    14
}

fn default_scrypt_r() -> u32 {
    8
}

fn default_scrypt_p() -> u32 {
    1
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: None,
            relock_policy: RelockPolicy::default(),
            scrypt_log_n: default_scrypt_log_n(),
            scrypt_r: default_scrypt_r(),
            scrypt_p: default_scrypt_p(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the app config directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `path`, or from the default location if `None`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CredVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// `<config dir>/credvault/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(app_config_dir()?.join(Self::FILE_NAME))
    }

    /// The record file to use: the configured one, or
    /// `<config dir>/credvault/vaults.json`.
    pub fn vault_file(&self) -> Result<PathBuf> {
        match &self.vault_file {
            Some(path) => Ok(path.clone()),
            None => Ok(app_config_dir()?.join("vaults.json")),
        }
    }

    /// Convert the scrypt settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            log_n: self.scrypt_log_n,
            r: self.scrypt_r,
            p: self.scrypt_p,
        }
    }
}

fn app_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .ok_or_else(|| CredVaultError::ConfigError("could not determine config directory".into()))
}

// ── Tests ────────────────────────────────────────────────────────────
