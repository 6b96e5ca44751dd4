//! `credvault create` — create a new, empty vault.

use crate::cli::output;
use crate::cli::{open_manager, prompt_new_password, Cli};
use crate::errors::{CredVaultError, Result};
use crate::vault::entity::validate_vault_name;

/// Execute the `create` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let mut manager = open_manager(cli)?;

    // Fail before prompting for a password we would throw away.
    validate_vault_name(name)?;
    if manager.contains(name) {
        return Err(CredVaultError::VaultAlreadyExists(name.to_string()));
    }

    let password = prompt_new_password()?;
    manager.create_vault(name, &password)?;

    output::success(&format!("Vault '{name}' created successfully"));
    output::tip(&format!("Run `credvault store {name} <KEY>` to add a credential."));

    Ok(())
}
