//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod capacity;
mod decode;
mod encode;
mod keygen;

pub use capacity::CapacityCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use keygen::KeygenCommand;

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use pixelveil::crypto::{derive_from_password, load_key, Salt, SymmetricKey, SALT_SIZE};
use pixelveil::{Placement, StegoConfig};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Reads a password from the environment variable named `var`, if any.
fn read_password(var: Option<&str>) -> Result<Option<String>> {
    match var {
        Some(name) => {
            let password = std::env::var(name)
                .with_context(|| format!("Environment variable {} is not set", name))?;
            Ok(Some(password))
        }
        None => Ok(None),
    }
}

/// Loads the session config, letting `--seed` override its placement.
fn resolve_config(path: Option<&Path>, seed: Option<u64>) -> Result<StegoConfig> {
    let mut config = match path {
        Some(p) => StegoConfig::load(p)
            .with_context(|| format!("Failed to load config from {}", p.display()))?,
        None => StegoConfig::default(),
    };
    if let Some(seed) = seed {
        config.placement = Placement::Permuted { seed };
    }
    Ok(config)
}

/// Resolves the session key from a key file, or from the password and the
/// derivation salt printed by `keygen --derive`.
fn resolve_key(
    key_path: Option<&Path>,
    salt: Option<&str>,
    password: Option<&str>,
) -> Result<SymmetricKey> {
    match (key_path, salt) {
        (Some(path), None) => load_key(path, password)
            .with_context(|| format!("Failed to load key from {}", path.display())),
        (None, Some(salt)) => {
            let password = password.context("--salt needs a password (--password-env)")?;
            let (key, _) = derive_from_password(password, Some(parse_salt(salt)?));
            Ok(key)
        }
        (Some(_), Some(_)) => bail!("Give either a key file or a salt, not both"),
        (None, None) => bail!("A key file (--key) or a derivation salt (--salt) is required"),
    }
}

/// Parses a base64 derivation salt.
fn parse_salt(encoded: &str) -> Result<Salt> {
    let bytes = BASE64
        .decode(encoded.trim())
        .context("Salt is not valid base64")?;
    let bytes: [u8; SALT_SIZE] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("Salt must be {} bytes, got {}", SALT_SIZE, bytes.len()))?;
    Ok(Salt::from_bytes(bytes))
}
