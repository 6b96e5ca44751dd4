use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in CredVault.
#[derive(Debug, Error)]
pub enum CredVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong password or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Validation errors ---
    #[error("Invalid vault name: {0}")]
    InvalidVaultName(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Vault name '{given}' does not match vault '{expected}'")]
    VaultNameMismatch { expected: String, given: String },

    // --- Vault errors ---
    #[error("Vault '{0}' does not exist")]
    VaultNotFound(String),

    #[error("Vault '{0}' already exists, please choose a different name")]
    VaultAlreadyExists(String),

    #[error("Vault '{0}' is locked — unlock it first")]
    VaultLocked(String),

    #[error("Vault '{0}' needs its password before it can be modified")]
    PasswordRequired(String),

    #[error("Credential '{0}' not found")]
    CredentialNotFound(String),

    #[error("Credential '{0}' already exists in this vault")]
    CredentialAlreadyExists(String),

    // --- Record file errors ---
    #[error("Invalid record file {path}: {reason}")]
    InvalidRecordFile { path: PathBuf, reason: String },

    // --- Share errors ---
    #[error("Invalid share token: {0}")]
    InvalidShareToken(String),

    #[error("Share failed: {0}")]
    ShareFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Coarse classification of a [`CredVaultError`].
///
/// Front-ends match on this instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed vault name, password or credential.
    Validation,
    /// Vault name or credential key collision.
    Duplicate,
    /// Vault or credential absent.
    NotFound,
    /// Wrong password or failed integrity check.
    Auth,
    /// Operation not allowed in the vault's current lock state.
    State,
    /// Record file could not be read, parsed or written.
    Io,
    /// Transfer token could not be parsed.
    InvalidToken,
    /// Transfer token could not be produced or verified.
    Share,
    Config,
    Command,
}

impl CredVaultError {
    /// The machine-inspectable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EncryptionFailed(_) | Self::DecryptionFailed | Self::KeyDerivationFailed(_) => {
                ErrorKind::Auth
            }
            Self::InvalidVaultName(_)
            | Self::InvalidPassword(_)
            | Self::InvalidCredential(_)
            | Self::VaultNameMismatch { .. } => ErrorKind::Validation,
            Self::VaultAlreadyExists(_) | Self::CredentialAlreadyExists(_) => ErrorKind::Duplicate,
            Self::VaultNotFound(_) | Self::CredentialNotFound(_) => ErrorKind::NotFound,
            Self::VaultLocked(_) | Self::PasswordRequired(_) => ErrorKind::State,
            Self::InvalidRecordFile { .. } | Self::Io(_) | Self::SerializationError(_) => {
                ErrorKind::Io
            }
            Self::InvalidShareToken(_) => ErrorKind::InvalidToken,
            Self::ShareFailed(_) => ErrorKind::Share,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::CommandFailed(_) | Self::UserCancelled => ErrorKind::Command,
        }
    }
}

/// Convenience type alias for CredVault results.
pub type Result<T> = std::result::Result<T, CredVaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_failures_surface_as_auth() {
        assert_eq!(CredVaultError::DecryptionFailed.kind(), ErrorKind::Auth);
        assert_eq!(
            CredVaultError::KeyDerivationFailed("bad params".into()).kind(),
            ErrorKind::Auth
        );
    }

    #[test]
    fn io_errors_are_io_kind() {
        let err = CredVaultError::from(std::io::Error::other("disk full"));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn name_mismatch_message_names_both_vaults() {
        let err = CredVaultError::VaultNameMismatch {
            expected: "teamsecrets".into(),
            given: "other".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("teamsecrets"));
        assert!(err.to_string().contains("other"));
    }
}
