//! `credvault share` — print a transfer token for a vault.

use crate::cli::output;
use crate::cli::{open_manager, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `share` command.
pub fn execute(cli: &Cli, vault: &str) -> Result<()> {
    let mut manager = open_manager(cli)?;

    let password = if manager.is_unlocked(vault)? {
        None
    } else {
        Some(prompt_password(vault)?)
    };

    let token = manager.share_vault(vault, password.as_ref().map(|p| p.as_str()))?;

    output::success(&format!("Share token generated for vault '{vault}'"));
    output::warning("Anyone holding this token can read the vault's credentials.");
    println!("{token}");

    Ok(())
}
