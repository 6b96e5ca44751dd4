//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{CredVaultError, Result};
use crate::vault::entity::MIN_PASSWORD_LEN;
use crate::vault::VaultManager;

/// Environment variable checked before prompting for a password.
pub const PASSWORD_ENV: &str = "CREDVAULT_PASSWORD";

/// CredVault CLI: password-protected credential vaults.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Manage your credentials securely and easily",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Record file holding all vaults (default: <config dir>/credvault/vaults.json)
    #[arg(long, global = true, env = "CREDVAULT_FILE")]
    pub vault_file: Option<PathBuf>,

    /// Config file (default: <config dir>/credvault/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// List all vaults
    List,

    /// Create a new vault
    Create {
        /// Vault name (at least 5 characters, no spaces)
        name: String,
    },

    /// Delete an existing vault
    Delete {
        /// Name of the vault to delete
        name: String,
        /// Force delete without password verification
        #[arg(short, long)]
        force: bool,
    },

    /// Lock a vault
    Lock {
        /// Name of the vault to lock
        name: String,
    },

    /// Unlock a vault
    Unlock {
        /// Name of the vault to unlock
        name: String,
    },

    /// Store a credential in a vault
    Store {
        /// Vault name
        vault: String,
        /// Credential name
        key: String,
        /// Credential value (omit for interactive prompt)
        value: Option<String>,
    },

    /// View the credentials in a vault
    View {
        /// Vault name
        vault: String,
    },

    /// Remove a credential from a vault
    Remove {
        /// Vault name
        vault: String,
        /// Credential name
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a share token for a vault
    Share {
        /// Vault name
        vault: String,
    },

    /// Import a vault from a share token
    Receive {
        /// Share token (omit for interactive prompt)
        token: Option<String>,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings, honouring `--config` and `--vault-file`.
pub fn settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(path) = &cli.vault_file {
        settings.vault_file = Some(path.clone());
    }
    Ok(settings)
}

/// Open the vault manager for the configured record file.
pub fn open_manager(cli: &Cli) -> Result<VaultManager> {
    VaultManager::from_settings(&settings(cli)?)
}

/// Get a vault password, trying in order:
/// 1. `CREDVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password(vault_name: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Enter password for vault '{vault_name}'"))
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `create` and
/// `receive`).
///
/// Also respects `CREDVAULT_PASSWORD` for scripted usage.
/// Enforces the minimum password length.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        if pw.chars().count() < MIN_PASSWORD_LEN {
            return Err(CredVaultError::CommandFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt(format!(
                "Choose vault password (minimum {MIN_PASSWORD_LEN} characters)"
            ))
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Default `tracing` filter for a given `-v` count.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "credvault=warn",
        1 => "credvault=debug",
        _ => "credvault=trace",
    }
}
