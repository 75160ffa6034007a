//! Integration tests for pixelveil
//!
//! Covers the full pipeline: key handling, sealing, framing, placement,
//! embedding into a buffer and decoding it back.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pixelveil::crypto::{derive_from_password, load_key, save_key, Salt, SymmetricKey};
use pixelveil::stego::{frame_bit_len, DELIMITER};
use pixelveil::{
    decode, decode_with_config, encode, encode_with_config, DecoderError, EncoderConfig,
    ImageCarrier, Placement,
};

/// Deterministic noisy carrier.
fn noisy_buffer(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

/// Noisy carrier whose LSBs are all zero, so it cannot contain a delimiter.
fn clean_buffer(len: usize, seed: u64) -> Vec<u8> {
    noisy_buffer(len, seed).into_iter().map(|b| b & 0xFE).collect()
}

/// Test basic encode/decode roundtrip
#[test]
fn test_encode_decode_roundtrip() {
    let key = SymmetricKey::generate();
    let mut buffer = noisy_buffer(2000, 1);

    encode(&mut buffer, "Hello, this is a secret message!", &key).unwrap();
    let decoded = decode(&buffer, &key).unwrap();

    assert_eq!(decoded, "Hello, this is a secret message!");
}

/// Test the "HELLO WORLD" scenario: frame size and untouched tail
#[test]
fn test_hello_world_frame_size() {
    let key = SymmetricKey::generate();
    let original = noisy_buffer(2000, 2);
    let mut buffer = original.clone();

    let encoded = encode(&mut buffer, "HELLO WORLD", &key).unwrap();

    // 96 nonce bits + 8 * (11 + 32 checksum + 16 tag) + 16 delimiter bits
    assert_eq!(encoded.frame_bits, 96 + 8 * (11 + 32 + 16) + 16);
    assert_eq!(encoded.report.positions_written, 584);

    let changed = buffer.iter().zip(&original).filter(|(a, b)| a != b).count();
    assert_eq!(changed, encoded.report.bytes_changed);
    assert!(changed <= 584);
    assert_eq!(&buffer[584..], &original[584..]);

    assert_eq!(decode(&buffer, &key).unwrap(), "HELLO WORLD");
}

/// Test roundtrip with permuted placement
#[test]
fn test_permuted_roundtrip() {
    let key = SymmetricKey::generate();
    let config = EncoderConfig::with_placement(Placement::Permuted { seed: 42 });
    let mut buffer = noisy_buffer(6000, 3);

    encode_with_config(&mut buffer, "scattered bits", &key, &config).unwrap();

    assert_eq!(
        decode_with_config(&buffer, &key, &config).unwrap(),
        "scattered bits"
    );
}

/// Test that decoding with the wrong plan fails instead of returning garbage
#[test]
fn test_wrong_placement_fails() {
    let key = SymmetricKey::generate();
    let encode_config = EncoderConfig::with_placement(Placement::Permuted { seed: 42 });
    let mut buffer = clean_buffer(6000, 4);

    encode_with_config(&mut buffer, "scattered bits", &key, &encode_config).unwrap();

    let wrong_seed = EncoderConfig::with_placement(Placement::Permuted { seed: 43 });
    assert!(decode_with_config(&buffer, &key, &wrong_seed).is_err());
    assert!(decode(&buffer, &key).is_err());
}

/// Test unicode and empty messages
#[test]
fn test_unicode_and_empty_messages() {
    let key = SymmetricKey::generate();

    for message in ["", "ñandú 🦤 über", "a"] {
        let mut buffer = noisy_buffer(3000, 5);
        encode(&mut buffer, message, &key).unwrap();
        assert_eq!(decode(&buffer, &key).unwrap(), message);
    }
}

/// Test that re-encoding the same message uses a fresh nonce
#[test]
fn test_encoding_uses_random_nonces() {
    let key = SymmetricKey::generate();
    let original = noisy_buffer(2000, 6);

    let mut a = original.clone();
    let mut b = original.clone();
    encode(&mut a, "same message", &key).unwrap();
    encode(&mut b, "same message", &key).unwrap();

    let nonce_a: Vec<u8> = a[..96].iter().map(|x| x & 1).collect();
    let nonce_b: Vec<u8> = b[..96].iter().map(|x| x & 1).collect();
    assert_ne!(nonce_a, nonce_b);
}

/// Flipping any single embedded bit before the delimiter is an integrity violation
#[test]
fn test_single_bit_tamper_detected() {
    let key = SymmetricKey::generate();
    let mut buffer = noisy_buffer(2000, 7);
    let encoded = encode(&mut buffer, "HELLO WORLD", &key).unwrap();

    let payload_bits = encoded.frame_bits - DELIMITER.len();
    for i in 0..payload_bits {
        let mut tampered = buffer.clone();
        tampered[i] ^= 0x01;

        let err = decode(&tampered, &key).unwrap_err();
        assert!(
            err.is_integrity_violation(),
            "bit {} gave unexpected error: {}",
            i,
            err
        );
    }
}

/// Flipping a non-LSB bit does not affect decoding
#[test]
fn test_upper_bits_ignored() {
    let key = SymmetricKey::generate();
    let mut buffer = noisy_buffer(2000, 8);
    encode(&mut buffer, "robust", &key).unwrap();

    for byte in buffer.iter_mut() {
        *byte ^= 0b1000_0010;
    }

    assert_eq!(decode(&buffer, &key).unwrap(), "robust");
}

/// Test that the wrong key yields an integrity violation
#[test]
fn test_wrong_key_fails() {
    let mut buffer = noisy_buffer(2000, 9);
    encode(&mut buffer, "secret", &SymmetricKey::generate()).unwrap();

    let err = decode(&buffer, &SymmetricKey::generate()).unwrap_err();
    assert!(err.is_integrity_violation());
}

/// A frame exactly as long as the buffer fits; one byte less does not
#[test]
fn test_capacity_boundary() {
    let key = SymmetricKey::generate();
    let needed = frame_bit_len(11);

    let mut exact = clean_buffer(needed, 10);
    encode(&mut exact, "HELLO WORLD", &key).unwrap();
    assert_eq!(decode(&exact, &key).unwrap(), "HELLO WORLD");

    let original = clean_buffer(needed - 1, 10);
    let mut short = original.clone();
    let err = encode(&mut short, "HELLO WORLD", &key).unwrap_err();
    assert!(err.is_capacity_exceeded());
    assert_eq!(short, original);
}

/// Untouched buffers report that no message is present
#[test]
fn test_no_hidden_message() {
    let key = SymmetricKey::generate();

    let err = decode(&clean_buffer(5000, 11), &key).unwrap_err();
    assert!(err.is_no_hidden_message());

    let err = decode(&noisy_buffer(100, 12), &key).unwrap_err();
    assert!(err.is_no_hidden_message());

    let err = decode(&[], &key).unwrap_err();
    assert!(matches!(err, DecoderError::ExtractError(_)));
}

/// KDF is deterministic per salt and differs across salts
#[test]
fn test_kdf_determinism() {
    let salt = Salt::generate();
    let (k1, _) = derive_from_password("pw", Some(salt));
    let (k2, _) = derive_from_password("pw", Some(salt));
    assert_eq!(k1, k2);

    let (k3, _) = derive_from_password("pw", Some(Salt::generate()));
    assert_ne!(k1, k3);
}

/// Password-derived key, stored wrapped, used to encode and decode
#[test]
fn test_password_key_file_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("secret.key");

    let (key, _salt) = derive_from_password("hunter2", None);
    save_key(&key, &path, Some("hunter2")).unwrap();

    let mut buffer = noisy_buffer(2000, 13);
    encode(&mut buffer, "from a key file", &key).unwrap();

    let loaded = load_key(&path, Some("hunter2")).unwrap();
    assert_eq!(decode(&buffer, &loaded).unwrap(), "from a key file");

    assert!(load_key(&path, Some("hunter3")).is_err());
}

/// Independent decodes can run in parallel
#[test]
fn test_parallel_decodes() {
    let inputs: Vec<(SymmetricKey, Vec<u8>, String)> = (0..4)
        .map(|i| {
            let key = SymmetricKey::generate();
            let mut buffer = noisy_buffer(2500, 100 + i);
            let message = format!("message number {}", i);
            encode(&mut buffer, &message, &key).unwrap();
            (key, buffer, message)
        })
        .collect();

    std::thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|(key, buffer, message)| {
                s.spawn(move || assert_eq!(&decode(buffer, key).unwrap(), message))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}

/// Full pipeline through a PNG carrier
#[test]
fn test_image_carrier_roundtrip() {
    use image::{DynamicImage, ImageBuffer, Rgb};

    let img = ImageBuffer::from_fn(64, 64, |x, y| {
        Rgb([(x * 3) as u8, (y * 5) as u8, ((x ^ y) * 7) as u8])
    });
    let mut carrier = ImageCarrier::from_image(DynamicImage::ImageRgb8(img));

    let key = SymmetricKey::generate();
    let config = EncoderConfig::with_placement(Placement::Permuted { seed: 7 });
    encode_with_config(carrier.pixels_mut(), "inside a png", &key, &config).unwrap();

    let png = carrier.to_png_bytes().unwrap();
    let reloaded = ImageCarrier::from_bytes(&png).unwrap();

    assert_eq!(
        decode_with_config(reloaded.pixels(), &key, &config).unwrap(),
        "inside a png"
    );
}
