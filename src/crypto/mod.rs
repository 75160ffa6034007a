//! Cryptographic operations for pixelveil.
//!
//! This module provides:
//! - Key generation and password derivation (PBKDF2-HMAC-SHA256)
//! - Key file storage, raw or password-wrapped (ChaCha20Poly1305)
//! - Message sealing with an appended SHA-256 checksum (ChaCha20Poly1305)

pub mod codec;
pub mod keys;

pub use codec::{decrypt_message, encrypt_message, CodecError, SealedMessage};
pub use keys::{
    derive_from_password, load_key, load_key_with_salt, save_key, save_key_without_salt, KeyError, Salt, StoredKey,
    SymmetricKey, KEY_SIZE, PBKDF2_ITERATIONS, SALT_SIZE,
};

/// Nonce size for ChaCha20Poly1305.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// SHA-256 digest size.
pub const CHECKSUM_SIZE: usize = 32;
