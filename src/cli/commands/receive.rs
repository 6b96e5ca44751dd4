//! `credvault receive` — import a vault from a transfer token.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_manager, prompt_new_password, Cli};
use crate::errors::{CredVaultError, Result};

/// Execute the `receive` command.
pub fn execute(cli: &Cli, token: Option<&str>) -> Result<()> {
    let mut manager = open_manager(cli)?;

    let token = match token {
        Some(t) => Zeroizing::new(t.to_string()),
        None => Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Paste share token")
                .interact()
                .map_err(|e| CredVaultError::CommandFailed(format!("token prompt: {e}")))?,
        ),
    };
    if token.trim().is_empty() {
        return Err(CredVaultError::InvalidShareToken("share token is required".into()));
    }

    output::info("Choose a password for the received vault.");
    let password = prompt_new_password()?;
    let name = manager.receive_vault(&token, &password)?;

    output::success(&format!("Vault '{name}' received successfully"));

    Ok(())
}
