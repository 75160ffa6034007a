//! Authenticated message encryption for embedding.
//!
//! This module provides:
//! - SHA-256 checksum appended to the plaintext
//! - ChaCha20Poly1305 over `plaintext || checksum` with a fresh nonce per call
//!
//! Wire format: nonce (12 bytes) || ciphertext (variable, includes auth tag)

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::keys::SymmetricKey;
use super::{CHECKSUM_SIZE, NONCE_SIZE, TAG_SIZE};

/// Errors that can occur while sealing or opening a message.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Wrong key, corrupted bits or tampering. These are indistinguishable.
    #[error("Message integrity violation")]
    IntegrityViolation,

    #[error("Message checksum mismatch")]
    ChecksumMismatch,

    #[error("Decrypted message is not valid UTF-8")]
    InvalidUtf8,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
}

/// A nonce and the ciphertext it was used for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl SealedMessage {
    /// Serializes as `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        result.extend_from_slice(&self.nonce);
        result.extend_from_slice(&self.ciphertext);
        result
    }

    /// Parses `nonce || ciphertext`.
    ///
    /// Input too short to hold a nonce and a tag is reported as an integrity
    /// violation so callers see a single failure mode.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CodecError::IntegrityViolation);
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[..NONCE_SIZE]);
        Ok(Self {
            nonce,
            ciphertext: data[NONCE_SIZE..].to_vec(),
        })
    }

    /// Serialized length of a sealed message carrying `plaintext_len` bytes.
    pub const fn sealed_len(plaintext_len: usize) -> usize {
        NONCE_SIZE + plaintext_len + CHECKSUM_SIZE + TAG_SIZE
    }
}

/// Encrypts `plaintext` with its checksum under a fresh random nonce.
pub fn encrypt_message(plaintext: &str, key: &SymmetricKey) -> Result<SealedMessage, CodecError> {
    let checksum = Sha256::digest(plaintext.as_bytes());

    let mut body = Vec::with_capacity(plaintext.len() + CHECKSUM_SIZE);
    body.extend_from_slice(plaintext.as_bytes());
    body.extend_from_slice(&checksum);

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CodecError::EncryptionFailed(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), body.as_slice())
        .map_err(|e| CodecError::EncryptionFailed(e.to_string()))?;

    Ok(SealedMessage { nonce, ciphertext })
}

/// Decrypts and verifies a sealed message.
pub fn decrypt_message(
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    key: &SymmetricKey,
) -> Result<String, CodecError> {
    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|_| CodecError::IntegrityViolation)?;

    let body = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CodecError::IntegrityViolation)?;

    verify_checksum(body)
}

/// Splits off the trailing checksum and compares it with a fresh digest.
fn verify_checksum(mut body: Vec<u8>) -> Result<String, CodecError> {
    if body.len() < CHECKSUM_SIZE {
        return Err(CodecError::ChecksumMismatch);
    }

    let checksum = body.split_off(body.len() - CHECKSUM_SIZE);
    if Sha256::digest(&body).as_slice() != checksum.as_slice() {
        return Err(CodecError::ChecksumMismatch);
    }

    String::from_utf8(body).map_err(|_| CodecError::InvalidUtf8)
}
