//! Transfer tokens for handing a vault to someone else.
//!
//! A token is `base64(JSON { name, ciphertext, password })`.  The
//! ciphertext is a fresh seal of the vault's current credentials under a
//! random one-off passphrase, and that passphrase travels in the token.
//! Whoever holds the token can open the snapshot, but the owner's vault
//! password never leaves the process.

use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::credential::Credential;
use super::entity::{check_credential_set, validate_vault_name, Vault};
use crate::crypto::Codec;
use crate::errors::{CredVaultError, Result};

/// Random bytes behind each share passphrase.
const SHARE_SECRET_LEN: usize = 32;

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct ShareEnvelope {
    name: String,
    #[serde(alias = "encryptedData")]
    ciphertext: String,
    password: String,
}

/// Build a transfer token from an unlocked vault.
///
/// Always re-seals the live credentials, never the stored ciphertext,
/// so the token reflects the latest state.
pub fn generate_share_id(codec: &Codec, vault: &Vault) -> Result<String> {
    let credentials = vault.credentials().map_err(|_| {
        CredVaultError::ShareFailed(format!(
            "vault '{}' must be unlocked before it can be shared",
            vault.name()
        ))
    })?;

    let passphrase = share_passphrase();
    let envelope = ShareEnvelope {
        name: vault.name().to_string(),
        ciphertext: codec.encrypt(credentials, &passphrase)?,
        password: passphrase.as_str().to_owned(),
    };

    let json = Zeroizing::new(
        serde_json::to_vec(&envelope)
            .map_err(|e| CredVaultError::SerializationError(format!("share token: {e}")))?,
    );

    tracing::info!(vault = %vault.name(), credentials = credentials.len(), "generated share token");
    Ok(BASE64.encode(json.as_slice()))
}

/// Reconstruct a vault from a transfer token.
///
/// The returned vault is unlocked and holds the token's passphrase as
/// its session password.  A token whose credentials are not a valid set
/// (an empty field or a repeated key) is rejected.
pub fn receive_vault(codec: &Codec, token: &str) -> Result<Vault> {
    let json = Zeroizing::new(
        BASE64
            .decode(token.trim())
            .map_err(|_| CredVaultError::InvalidShareToken("not valid base64".into()))?,
    );

    let envelope: ShareEnvelope = serde_json::from_slice(&json)
        .map_err(|e| CredVaultError::InvalidShareToken(format!("malformed token: {e}")))?;

    validate_vault_name(&envelope.name)
        .map_err(|e| CredVaultError::InvalidShareToken(e.to_string()))?;
    if envelope.password.is_empty() {
        return Err(CredVaultError::InvalidShareToken(
            "token carries no passphrase".into(),
        ));
    }

    let credentials: Vec<Credential> = codec
        .decrypt(&envelope.ciphertext, &envelope.password)
        .map_err(|_| {
            CredVaultError::ShareFailed(format!(
                "token for vault '{}' could not be verified",
                envelope.name
            ))
        })?;
    check_credential_set(&credentials)
        .map_err(|e| CredVaultError::InvalidShareToken(e.to_string()))?;

    Ok(Vault::from_verified(
        envelope.name.clone(),
        envelope.ciphertext.clone(),
        credentials,
        Zeroizing::new(envelope.password.clone()),
    ))
}

fn share_passphrase() -> Zeroizing<String> {
    let mut bytes = Zeroizing::new([0u8; SHARE_SECRET_LEN]);
    rand::rng().fill_bytes(bytes.as_mut_slice());
    Zeroizing::new(URL_SAFE_NO_PAD.encode(bytes.as_slice()))
}
