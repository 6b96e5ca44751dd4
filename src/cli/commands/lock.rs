//! `credvault lock` — lock a vault.

use crate::cli::output;
use crate::cli::{open_manager, Cli};
use crate::errors::Result;
use crate::vault::LockOutcome;

/// Execute the `lock` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let mut manager = open_manager(cli)?;

    match manager.lock_vault(name)? {
        LockOutcome::Locked => output::success(&format!("Vault '{name}' locked successfully")),
        LockOutcome::AlreadyLocked => output::info(&format!("Vault '{name}' is already locked")),
    }

    Ok(())
}
