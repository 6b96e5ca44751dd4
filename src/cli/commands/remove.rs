//! `credvault remove` — delete a credential from a vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_manager, prompt_password, Cli};
use crate::errors::{CredVaultError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, vault: &str, key: &str, force: bool) -> Result<()> {
    let mut manager = open_manager(cli)?;
    let needs_password = !manager.vault(vault)?.has_session_password();

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete credential '{key}' from vault '{vault}'?"))
            .default(false)
            .interact()
            .map_err(|e| CredVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Deletion cancelled.");
            return Ok(());
        }
    }

    let password = if needs_password {
        Some(prompt_password(vault)?)
    } else {
        None
    };

    manager.delete_credential(vault, password.as_ref().map(|p| p.as_str()), key)?;

    output::success(&format!("Deleted credential '{key}' from vault '{vault}'"));

    Ok(())
}
