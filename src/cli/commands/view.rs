//! `credvault view` — print the credentials of a vault.

use crate::cli::output;
use crate::cli::{open_manager, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `view` command.
pub fn execute(cli: &Cli, vault: &str) -> Result<()> {
    let mut manager = open_manager(cli)?;

    let password = if manager.is_unlocked(vault)? {
        None
    } else {
        Some(prompt_password(vault)?)
    };

    let credentials = manager.get_credentials(vault, password.as_ref().map(|p| p.as_str()))?;

    output::info(&format!(
        "Vault '{vault}' — {} credential(s)",
        credentials.len()
    ));
    output::print_credentials_table(&credentials);

    Ok(())
}
