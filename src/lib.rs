//! # pixelveil - Hide sealed messages in pixel LSBs
//!
//! pixelveil encrypts a text message, frames it, and writes it one bit per byte
//! into the least significant bits of a raw pixel buffer. Decoding reads the
//! bits back in the same order, finds the end-of-frame delimiter, and verifies
//! the message before returning it.
//!
//! ## Overview
//!
//! - Keys are random or derived from a password (PBKDF2-HMAC-SHA256, 100k rounds)
//! - Messages carry a SHA-256 checksum and are sealed with ChaCha20Poly1305
//! - Every encode uses a **fresh nonce**, embedded in the frame
//! - Frame: `nonce (96 bits) || ciphertext || 1111111111111110`
//! - Placement is sequential, or a permutation derived from an explicit seed
//! - The core works on `&mut [u8]`; image files are handled by [`stego::ImageCarrier`]
//!
//! ## Example Usage
//!
//! ```rust
//! use pixelveil::crypto::SymmetricKey;
//! use pixelveil::{decode, encode};
//!
//! let key = SymmetricKey::generate();
//! let mut pixels = vec![0x7Fu8; 2000];
//!
//! let encoded = encode(&mut pixels, "HELLO WORLD", &key).unwrap();
//! assert_eq!(encoded.frame_bits, 584);
//!
//! let message = decode(&pixels, &key).unwrap();
//! assert_eq!(message, "HELLO WORLD");
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: Key management and message sealing
//! - [`stego`]: Bit framing, placement plans, embedding and extraction
//! - [`encoder`]: Message encoding into a buffer
//! - [`decoder`]: Message decoding from a buffer
//! - [`config`]: Persistent session settings

pub mod config;
pub mod crypto;
pub mod decoder;
pub mod encoder;
pub mod stego;

// Re-export commonly used types at the crate root
pub use config::{ConfigError, StegoConfig};
pub use crypto::{KeyError, Salt, StoredKey, SymmetricKey};
pub use decoder::{decode, decode_with_config, DecoderConfig, DecoderError};
pub use encoder::{encode, encode_with_config, EncodedMessage, EncoderConfig, EncoderError};
pub use stego::{ImageCarrier, Placement, PlacementPlan};
