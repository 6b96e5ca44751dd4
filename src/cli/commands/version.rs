//! `credvault version` — display version and build details.

use console::style;

use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("credvault {current}");
    println!(
        "{}",
        style("AES-256-GCM with scrypt key derivation").dim()
    );

    Ok(())
}
