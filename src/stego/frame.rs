//! Bit framing for embedded messages.
//!
//! A frame is the MSB-first bit expansion of a sealed message followed by
//! a fixed 16-bit delimiter. Each bit is stored as a `u8` holding 0 or 1.

use crate::crypto::SealedMessage;

/// End-of-frame marker: fifteen ones and a zero.
pub const DELIMITER: [u8; 16] = [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0];

/// Fewest payload bits a genuine frame can have (empty message).
pub const MIN_FRAME_BITS: usize = SealedMessage::sealed_len(0) * 8;

/// Expands `bytes` to bits and appends the delimiter.
pub fn to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8 + DELIMITER.len());
    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits.extend_from_slice(&DELIMITER);
    bits
}

/// Packs bits back into bytes. A trailing partial byte is dropped.
pub fn from_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, bit| (acc << 1) | (bit & 1)))
        .collect()
}

/// Total frame length in bits for a message of `message_len` bytes.
pub fn frame_bit_len(message_len: usize) -> usize {
    SealedMessage::sealed_len(message_len) * 8 + DELIMITER.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_expansion() {
        let bits = to_bits(&[0b1010_0001]);
        assert_eq!(&bits[..8], &[1, 0, 1, 0, 0, 0, 0, 1]);
        assert_eq!(&bits[8..], &DELIMITER);
    }

    #[test]
    fn test_empty_input_is_just_delimiter() {
        assert_eq!(to_bits(&[]), DELIMITER.to_vec());
    }

    #[test]
    fn test_from_bits_inverts_payload() {
        let data = b"frame me";
        let bits = to_bits(data);
        let payload = &bits[..bits.len() - DELIMITER.len()];

        assert_eq!(from_bits(payload), data.to_vec());
    }

    #[test]
    fn test_partial_byte_dropped() {
        assert_eq!(from_bits(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1]), vec![0xFF]);
    }

    #[test]
    fn test_frame_bit_len() {
        // 96 nonce bits + 8 * (11 + 32 + 16) + 16 delimiter bits
        assert_eq!(frame_bit_len(11), 584);
        assert_eq!(frame_bit_len(0), MIN_FRAME_BITS + 16);
        assert_eq!(MIN_FRAME_BITS, 480);
    }
}
