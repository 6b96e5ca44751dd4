//! Cryptographic primitives for CredVault.
//!
//! This module provides:
//! - The password-sealed AES-256-GCM blob codec (`encryption`)
//! - scrypt password-based key derivation (`kdf`)

pub mod encryption;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{Codec, KdfParams};
pub use encryption::Codec;
pub use kdf::{derive_key, generate_salt, KdfParams};
