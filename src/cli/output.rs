//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{Credential, VaultSummary};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of vaults (Name, State).
pub fn print_vaults_table(vaults: &[VaultSummary]) {
    if vaults.is_empty() {
        warning("No vaults available.");
        tip("Run `credvault create <NAME>` to create your first vault.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Vault", "State"]);

    for v in vaults {
        let state = if v.unlocked { "unlocked" } else { "locked" };
        table.add_row(vec![v.name.clone(), state.to_string()]);
    }

    println!("{table}");
}

/// Print a numbered table of credentials (#, Key, Value).
pub fn print_credentials_table(credentials: &[Credential]) {
    if credentials.is_empty() {
        warning("No credentials stored in this vault.");
        tip("Run `credvault store <VAULT> <KEY>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Key", "Value"]);

    for (i, c) in credentials.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), c.key.clone(), c.value.clone()]);
    }

    println!("{table}");
}
