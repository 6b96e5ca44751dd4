//! Password-sealed AES-256-GCM blobs.
//!
//! Each call to `Codec::encrypt_bytes` derives a fresh key from the
//! password and a random salt, encrypts under a random 12-byte nonce and
//! returns everything needed to reverse it as one base64 string.
//!
//! Layout of the decoded blob (fixed offsets, no delimiters):
//!   [ 16-byte salt | 12-byte nonce | 16-byte auth tag | ciphertext ]

use aes_gcm::aead::{AeadInPlace, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce, Tag};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::{Zeroize, Zeroizing};

use super::kdf::{derive_key, generate_salt, KdfParams, SALT_LEN};
use crate::errors::{CredVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Bytes in front of the ciphertext: salt + nonce + tag.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Stateless encrypt/decrypt of payloads under a password.
///
/// Holds only the KDF parameters; every blob carries its own salt
/// and nonce.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    params: KdfParams,
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            params: KdfParams::default(),
        }
    }
}

impl Codec {
    /// Build a codec, rejecting unusable KDF parameters up front.
    pub fn new(params: KdfParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The KDF parameters this codec seals and opens with.
    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Serialize `payload` as JSON and seal it under `password`.
    pub fn encrypt<T: Serialize + ?Sized>(&self, payload: &T, password: &str) -> Result<String> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(payload)
                .map_err(|e| CredVaultError::SerializationError(format!("payload: {e}")))?,
        );
        self.encrypt_bytes(&plaintext, password.as_bytes())
    }

    /// Open a blob produced by `encrypt` and parse its JSON payload.
    ///
    /// A payload that decrypts but does not parse as `T` is treated the
    /// same as a failed tag check.
    pub fn decrypt<T: DeserializeOwned>(&self, blob: &str, password: &str) -> Result<T> {
        let plaintext = self.decrypt_bytes(blob, password.as_bytes())?;
        serde_json::from_slice(&plaintext).map_err(|_| CredVaultError::DecryptionFailed)
    }

    /// Seal raw bytes and return the base64 blob.
    pub fn encrypt_bytes(&self, plaintext: &[u8], password: &[u8]) -> Result<String> {
        let salt = generate_salt();

        let mut key = derive_key(password, &salt, &self.params)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CredVaultError::EncryptionFailed(format!("invalid key length: {e}")));
        key.zeroize();
        let cipher = cipher?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        // GCM is a stream mode: the ciphertext has the plaintext's length
        // and the tag comes back detached so it can sit before the data.
        let mut buffer = Zeroizing::new(plaintext.to_vec());
        let tag = cipher
            .encrypt_in_place_detached(&nonce, b"", buffer.as_mut_slice())
            .map_err(|e| CredVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

        let mut output = Vec::with_capacity(HEADER_LEN + buffer.len());
        output.extend_from_slice(&salt);
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&tag);
        output.extend_from_slice(&buffer);
        Ok(BASE64.encode(output))
    }

    /// Open a base64 blob and return the plaintext bytes.
    ///
    /// Fails with `DecryptionFailed` on bad base64, truncation, a wrong
    /// password or any tampering.
    pub fn decrypt_bytes(&self, blob: &str, password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let raw = BASE64
            .decode(blob.trim())
            .map_err(|_| CredVaultError::DecryptionFailed)?;

        // Make sure we have at least the fixed-size prefix.
        if raw.len() < HEADER_LEN {
            return Err(CredVaultError::DecryptionFailed);
        }

        let (salt, rest) = raw.split_at(SALT_LEN);
        let (nonce_bytes, rest) = rest.split_at(NONCE_LEN);
        let (tag_bytes, ciphertext) = rest.split_at(TAG_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let tag = Tag::from_slice(tag_bytes);

        let mut key = derive_key(password, salt, &self.params)?;
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CredVaultError::DecryptionFailed);
        key.zeroize();
        let cipher = cipher?;

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        cipher
            .decrypt_in_place_detached(nonce, b"", buffer.as_mut_slice(), tag)
            .map_err(|_| CredVaultError::DecryptionFailed)?;

        Ok(buffer)
    }
}
