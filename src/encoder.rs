//! Message encoding into a pixel buffer.
//!
//! This module orchestrates the encoding process:
//! 1. Seal the message (SHA-256 checksum + ChaCha20Poly1305, fresh nonce)
//! 2. Frame `nonce || ciphertext` as bits and append the delimiter
//! 3. Build the placement plan for the buffer
//! 4. Write the frame into the buffer's LSBs

use log::{debug, info};
use thiserror::Error;

use crate::config::StegoConfig;
use crate::crypto::{encrypt_message, CodecError, SymmetricKey};
use crate::stego::{embed, to_bits, EmbedError, EmbedReport, PlacementPlan};

/// Errors that can occur during encoding.
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("Encryption error: {0}")]
    CodecError(#[from] CodecError),

    #[error("Embedding error: {0}")]
    EmbedError(#[from] EmbedError),
}

impl EncoderError {
    /// True when the carrier is too small for the message.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::EmbedError(EmbedError::CapacityExceeded { .. }))
    }
}

/// Configuration for the encoder.
pub type EncoderConfig = StegoConfig;

/// Result of encoding a message.
#[derive(Debug, Clone)]
pub struct EncodedMessage {
    /// Length of the embedded frame in bits (= buffer positions used).
    pub frame_bits: usize,
    /// What the embed step touched.
    pub report: EmbedReport,
}

/// Encodes `message` into `buffer` with sequential placement.
pub fn encode(
    buffer: &mut [u8],
    message: &str,
    key: &SymmetricKey,
) -> Result<EncodedMessage, EncoderError> {
    encode_with_config(buffer, message, key, &EncoderConfig::default())
}

/// Encodes `message` into `buffer` with custom configuration.
///
/// On error the buffer is left untouched.
pub fn encode_with_config(
    buffer: &mut [u8],
    message: &str,
    key: &SymmetricKey,
    config: &EncoderConfig,
) -> Result<EncodedMessage, EncoderError> {
    let sealed = encrypt_message(message, key)?;
    let frame = to_bits(&sealed.to_bytes());

    debug!(
        "Framed {} byte message into {} bits for a {} byte buffer",
        message.len(),
        frame.len(),
        buffer.len()
    );

    let plan = PlacementPlan::new(config.placement, buffer.len());
    let report = embed(buffer, &frame, &plan)?;

    info!(
        "Message encoded ({} bits, {:?} placement)",
        frame.len(),
        config.placement
    );

    Ok(EncodedMessage {
        frame_bits: frame.len(),
        report,
    })
}
