//! `credvault delete` — remove a vault.

use crate::cli::output;
use crate::cli::{open_manager, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let mut manager = open_manager(cli)?;

    if force {
        output::warning("Deleting without password verification.");
        manager.delete_vault(name, None, true)?;
    } else {
        // Make sure the vault exists before asking for its password.
        manager.vault(name)?;
        let password = prompt_password(name)?;
        manager.delete_vault(name, Some(password.as_str()), false)?;
    }

    output::success(&format!("Vault '{name}' deleted successfully"));

    Ok(())
}
