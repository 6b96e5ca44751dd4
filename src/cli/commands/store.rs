//! `credvault store` — add a credential to a vault.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_manager, prompt_password, Cli};
use crate::errors::{CredVaultError, Result};
use crate::vault::Credential;

/// Execute the `store` command.
pub fn execute(cli: &Cli, vault: &str, key: &str, value: Option<&str>) -> Result<()> {
    let mut manager = open_manager(cli)?;
    let needs_password = !manager.vault(vault)?.has_session_password();

    let value = read_value(key, value)?;

    let password = if needs_password {
        Some(prompt_password(vault)?)
    } else {
        None
    };

    manager.add_credential(
        vault,
        password.as_ref().map(|p| p.as_str()),
        Credential::new(key, value.as_str()),
    )?;

    output::success(&format!("Stored credential '{key}' in vault '{vault}'"));

    Ok(())
}

/// The credential value from the command line, or prompted for.
fn read_value(key: &str, value: Option<&str>) -> Result<Zeroizing<String>> {
    match value {
        Some(v) => Ok(Zeroizing::new(v.to_string())),
        None => dialoguer::Password::new()
            .with_prompt(format!("Enter value for '{key}'"))
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| CredVaultError::CommandFailed(format!("value prompt: {e}"))),
    }
}
