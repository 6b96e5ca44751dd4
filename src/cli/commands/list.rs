//! `credvault list` — display all vaults in a table.

use crate::cli::output;
use crate::cli::{open_manager, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let manager = open_manager(cli)?;
    let vaults = manager.list_vaults();

    if !vaults.is_empty() {
        output::info(&format!("{} vault(s)", vaults.len()));
    }
    output::print_vaults_table(&vaults);

    Ok(())
}
