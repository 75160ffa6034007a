//! Symmetric key generation, password derivation and key file storage.
//!
//! Keys are either random or derived from a password with PBKDF2-HMAC-SHA256.
//! On disk a key is stored as a [`StoredKey`]: raw bytes, or wrapped with
//! ChaCha20Poly1305 under a password-derived key.
//!
//! File layouts (no header, fixed by length):
//! - raw: `key (32)`
//! - wrapped: `salt (16) || nonce (12) || ciphertext (48)`
//! - wrapped, salt kept elsewhere: `nonce (12) || ciphertext (48)`

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use log::{debug, info, warn};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::{NONCE_SIZE, TAG_SIZE};

/// Length of a symmetric key in bytes.
pub const KEY_SIZE: usize = 32;

/// Length of a password salt in bytes.
pub const SALT_SIZE: usize = 16;

/// PBKDF2 iteration count. Changing this invalidates every derived key.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Size of a wrapped key file that carries its own salt.
const WRAPPED_LEN: usize = SALT_SIZE + NONCE_SIZE + KEY_SIZE + TAG_SIZE;

/// Size of a wrapped key file whose salt is supplied by the caller.
const WRAPPED_NO_SALT_LEN: usize = NONCE_SIZE + KEY_SIZE + TAG_SIZE;

/// Errors that can occur during key operations.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Key file not found: {0}")]
    KeyFileNotFound(String),

    /// Wrong password, corrupted or truncated file. Deliberately uniform.
    #[error("Key decryption failed")]
    KeyDecryptionFailed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A 256-bit secret key.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SymmetricKey").field(&"[REDACTED]").finish()
    }
}

impl SymmetricKey {
    /// Generates a random key from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Short, non-secret identifier for display: base64 of the first 8 bytes of SHA-256(key).
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0);
        BASE64.encode(&digest[..8])
    }
}

/// A 16-byte password salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generates a fresh random salt.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Derives a key from a password. A fresh salt is generated when `salt` is `None`.
///
/// Deterministic for the same password and salt.
pub fn derive_from_password(password: &str, salt: Option<Salt>) -> (SymmetricKey, Salt) {
    let salt = salt.unwrap_or_else(Salt::generate);
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut key);
    (SymmetricKey(key), salt)
}

/// Key material as it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredKey {
    /// Unprotected key bytes.
    Raw(SymmetricKey),
    /// Key encrypted under a password-derived key.
    PasswordWrapped {
        salt: Salt,
        nonce: [u8; NONCE_SIZE],
        ciphertext: Vec<u8>,
    },
}

impl StoredKey {
    /// Wraps `key` under `password` with a fresh salt and nonce.
    pub fn wrap(key: &SymmetricKey, password: &str) -> Result<Self, KeyError> {
        let (salt, nonce, ciphertext) = seal_key(key, password)?;
        Ok(Self::PasswordWrapped {
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Recovers the key. `password` must be given exactly when the key is wrapped.
    pub fn unwrap_key(&self, password: Option<&str>) -> Result<SymmetricKey, KeyError> {
        match (self, password) {
            (Self::Raw(key), None) => Ok(key.clone()),
            (
                Self::PasswordWrapped {
                    salt,
                    nonce,
                    ciphertext,
                },
                Some(password),
            ) => unwrap_with(password, *salt, nonce, ciphertext),
            _ => Err(KeyError::KeyDecryptionFailed),
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, Self::PasswordWrapped { .. })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Raw(key) => key.as_bytes().to_vec(),
            Self::PasswordWrapped {
                salt,
                nonce,
                ciphertext,
            } => {
                let mut out = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
                out.extend_from_slice(salt.as_bytes());
                out.extend_from_slice(nonce);
                out.extend_from_slice(ciphertext);
                out
            }
        }
    }

    /// Parses a key file. The layout is chosen by length alone.
    pub fn from_bytes(data: &[u8]) -> Result<Self, KeyError> {
        match data.len() {
            KEY_SIZE => {
                let mut key = [0u8; KEY_SIZE];
                key.copy_from_slice(data);
                Ok(Self::Raw(SymmetricKey(key)))
            }
            WRAPPED_LEN => {
                let mut salt = [0u8; SALT_SIZE];
                salt.copy_from_slice(&data[..SALT_SIZE]);
                let mut nonce = [0u8; NONCE_SIZE];
                nonce.copy_from_slice(&data[SALT_SIZE..SALT_SIZE + NONCE_SIZE]);
                Ok(Self::PasswordWrapped {
                    salt: Salt(salt),
                    nonce,
                    ciphertext: data[SALT_SIZE + NONCE_SIZE..].to_vec(),
                })
            }
            _ => Err(KeyError::KeyDecryptionFailed),
        }
    }
}

fn seal_key(
    key: &SymmetricKey,
    password: &str,
) -> Result<(Salt, [u8; NONCE_SIZE], Vec<u8>), KeyError> {
    let (wrapping_key, salt) = derive_from_password(password, None);

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new_from_slice(wrapping_key.as_bytes())
        .map_err(|_| KeyError::KeyDecryptionFailed)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), key.as_bytes().as_slice())
        .map_err(|_| KeyError::KeyDecryptionFailed)?;

    Ok((salt, nonce, ciphertext))
}

fn unwrap_with(
    password: &str,
    salt: Salt,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<SymmetricKey, KeyError> {
    let (wrapping_key, _) = derive_from_password(password, Some(salt));

    let cipher = ChaCha20Poly1305::new_from_slice(wrapping_key.as_bytes())
        .map_err(|_| KeyError::KeyDecryptionFailed)?;
    let plain = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| KeyError::KeyDecryptionFailed)?;

    let bytes: [u8; KEY_SIZE] = plain
        .as_slice()
        .try_into()
        .map_err(|_| KeyError::KeyDecryptionFailed)?;
    Ok(SymmetricKey(bytes))
}

/// Saves `key` to `path`, wrapped when a password is given.
///
/// Returns what was written so the caller can keep the salt if needed.
pub fn save_key(
    key: &SymmetricKey,
    path: &Path,
    password: Option<&str>,
) -> Result<StoredKey, KeyError> {
    let stored = match password {
        Some(password) => StoredKey::wrap(key, password)?,
        None => {
            warn!("Saving unprotected key to {}", path.display());
            StoredKey::Raw(key.clone())
        }
    };

    write_private_file(path, &stored.to_bytes())?;

    info!(
        "{} key {} saved to {}",
        if stored.is_wrapped() { "Encrypted" } else { "Raw" },
        key.fingerprint(),
        path.display()
    );
    Ok(stored)
}

/// Loads a key written by [`save_key`].
pub fn load_key(path: &Path, password: Option<&str>) -> Result<SymmetricKey, KeyError> {
    let data = read_key_file(path)?;
    let stored = StoredKey::from_bytes(&data)?;
    debug!(
        "Loaded {} key file {}",
        if stored.is_wrapped() { "wrapped" } else { "raw" },
        path.display()
    );
    stored.unwrap_key(password)
}

/// Saves `key` wrapped under `password` as `nonce || ciphertext`, without the salt.
///
/// The returned salt is needed by [`load_key_with_salt`] and must be kept
/// separately.
pub fn save_key_without_salt(
    key: &SymmetricKey,
    path: &Path,
    password: &str,
) -> Result<Salt, KeyError> {
    let (salt, nonce, ciphertext) = seal_key(key, password)?;

    let mut data = Vec::with_capacity(WRAPPED_NO_SALT_LEN);
    data.extend_from_slice(&nonce);
    data.extend_from_slice(&ciphertext);
    write_private_file(path, &data)?;

    info!(
        "Encrypted key {} saved to {} (salt kept separately)",
        key.fingerprint(),
        path.display()
    );
    Ok(salt)
}

/// Loads a key written by [`save_key_without_salt`].
pub fn load_key_with_salt(path: &Path, password: &str, salt: Salt) -> Result<SymmetricKey, KeyError> {
    let data = read_key_file(path)?;
    if data.len() != WRAPPED_NO_SALT_LEN {
        return Err(KeyError::KeyDecryptionFailed);
    }
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&data[..NONCE_SIZE]);
    unwrap_with(password, salt, &nonce, &data[NONCE_SIZE..])
}

/// Writes `contents` to `path`, readable by the owner only on Unix.
///
/// The file is created with mode 0600 and an existing file is reset to 0600
/// before anything is written.
pub(crate) fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    Ok(())
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, KeyError> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => KeyError::KeyFileNotFound(path.display().to_string()),
        _ => KeyError::IoError(e),
    })
}
