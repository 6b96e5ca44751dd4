//! The key/value credential type stored inside a vault.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CredVaultError, Result};

/// A single credential: a unique key and its secret value.
///
/// Both strings are wiped from memory when the credential is dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    /// The name of the credential (e.g. "api").
    pub key: String,

    /// The secret value.
    pub value: String,
}

impl Credential {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Reject credentials with an empty key or value.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(CredVaultError::InvalidCredential(
                "credential key cannot be empty".into(),
            ));
        }
        if self.value.is_empty() {
            return Err(CredVaultError::InvalidCredential(format!(
                "credential '{}' has an empty value",
                self.key
            )));
        }
        Ok(())
    }
}

// Keep secret values out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &self.key)
            .field("value", &"<redacted>")
            .finish()
    }
}
