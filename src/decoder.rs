//! Message decoding from a pixel buffer.
//!
//! This module orchestrates the decoding process:
//! 1. Read the buffer's LSBs along the placement plan
//! 2. Locate delimiter candidates
//! 3. Pack each candidate's bits into `nonce || ciphertext`
//! 4. Decrypt and verify the checksum; the first candidate that opens wins
//!
//! At most [`MAX_DELIMITER_CANDIDATES`] candidates are tried per buffer.
//!
//! Decryption failures are reported uniformly: a wrong key, a wrong plan and
//! flipped bits all surface as an integrity violation.

use log::{debug, info};
use thiserror::Error;

use crate::config::StegoConfig;
use crate::crypto::{decrypt_message, CodecError, SealedMessage, SymmetricKey};
use crate::stego::{extract, from_bits, ExtractError, PlacementPlan, MAX_DELIMITER_CANDIDATES};

/// Errors that can occur during decoding.
#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("Extraction error: {0}")]
    ExtractError(#[from] ExtractError),

    #[error("Decryption error: {0}")]
    CodecError(#[from] CodecError),
}

impl DecoderError {
    /// True when no delimiter was found.
    pub fn is_no_hidden_message(&self) -> bool {
        matches!(self, Self::ExtractError(ExtractError::NoHiddenMessage))
    }

    /// True when authentication failed.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::CodecError(CodecError::IntegrityViolation))
    }
}

/// Configuration for the decoder. Must match the one used for encoding.
pub type DecoderConfig = StegoConfig;

/// Decodes a message embedded with sequential placement.
pub fn decode(buffer: &[u8], key: &SymmetricKey) -> Result<String, DecoderError> {
    decode_with_config(buffer, key, &DecoderConfig::default())
}

/// Decodes a message with custom configuration.
pub fn decode_with_config(
    buffer: &[u8],
    key: &SymmetricKey,
    config: &DecoderConfig,
) -> Result<String, DecoderError> {
    let plan = PlacementPlan::new(config.placement, buffer.len());
    let extraction = extract(buffer, &plan)?;

    let mut first_error = None;
    for (attempt, bits) in extraction
        .candidates()
        .take(MAX_DELIMITER_CANDIDATES)
        .enumerate()
    {
        match open_frame(bits, key) {
            Ok(message) => {
                info!("Message decoded from {} frame bits", bits.len());
                return Ok(message);
            }
            Err(e) => {
                debug!("Delimiter candidate {} rejected: {}", attempt, e);
                first_error.get_or_insert(e);
            }
        }
    }

    // extract() only succeeds with at least one candidate
    Err(first_error.unwrap_or(CodecError::IntegrityViolation).into())
}

fn open_frame(bits: &[u8], key: &SymmetricKey) -> Result<String, CodecError> {
    let sealed = SealedMessage::from_bytes(&from_bits(bits))?;
    decrypt_message(&sealed.nonce, &sealed.ciphertext, key)
}
