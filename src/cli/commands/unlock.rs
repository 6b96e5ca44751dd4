//! `credvault unlock` — unlock a vault.

use crate::cli::output;
use crate::cli::{open_manager, prompt_password, Cli};
use crate::errors::Result;
use crate::vault::UnlockOutcome;

/// Execute the `unlock` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let mut manager = open_manager(cli)?;

    if manager.is_unlocked(name)? {
        output::info(&format!("Vault '{name}' is already unlocked"));
        return Ok(());
    }

    let password = prompt_password(name)?;
    match manager.unlock_vault(name, &password)? {
        UnlockOutcome::Unlocked => output::success(&format!("Vault '{name}' unlocked successfully")),
        UnlockOutcome::AlreadyUnlocked => {
            output::info(&format!("Vault '{name}' is already unlocked"))
        }
    }
    output::warning("Unlocked vaults keep a plaintext copy of their credentials on disk until locked.");

    Ok(())
}
