//! Vault module — password-protected credential containers.
//!
//! This module provides:
//! - The `Credential` type (`credential`)
//! - The per-vault lock/unlock state machine (`entity`)
//! - The JSON record file shared by all vaults (`record`)
//! - Transfer tokens for handing a vault to someone else (`share`)
//! - `VaultManager`, which owns the collection and keeps disk in sync (`manager`)

pub mod credential;
pub mod entity;
pub mod manager;
pub mod record;
pub mod share;

// Re-export the most commonly used items.
pub use credential::Credential;
pub use entity::{LockOutcome, UnlockOutcome, Vault};
pub use manager::{VaultManager, VaultSummary};
pub use record::{RecordFile, VaultRecord};
