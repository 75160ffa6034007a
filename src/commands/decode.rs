//! Decode command - recover a hidden message from an image.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixelveil::{decode_with_config, ImageCarrier};

use super::{read_password, resolve_config, resolve_key, CommandExecutor};

/// Recover a message hidden with `encode`.
///
/// Key, password and placement must match the ones used for encoding.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Image containing the hidden message
    #[arg(short, long)]
    pub input: PathBuf,

    /// Key file
    #[arg(short, long, required_unless_present = "salt", conflicts_with = "salt")]
    pub key: Option<PathBuf>,

    /// Base64 salt printed by `keygen --derive`. The key is derived from the
    /// password instead of read from a file.
    #[arg(long, requires = "password_env")]
    pub salt: Option<String>,

    /// Environment variable holding the password
    #[arg(long)]
    pub password_env: Option<String>,

    /// Config file with placement settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Permuted placement seed used for encoding (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the message to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let password = read_password(self.password_env.as_deref())?;
        let key = resolve_key(self.key.as_deref(), self.salt.as_deref(), password.as_deref())?;
        let config = resolve_config(self.config.as_deref(), self.seed)?;

        let carrier = ImageCarrier::from_file(&self.input)
            .with_context(|| format!("Failed to read image from {}", self.input.display()))?;

        let message = decode_with_config(carrier.pixels(), &key, &config)
            .context("Failed to decode message")?;

        match &self.output {
            Some(path) => {
                fs::write(path, &message)
                    .with_context(|| format!("Failed to write message to {}", path.display()))?;
                eprintln!("Message written to {}", path.display());
            }
            None => println!("{}", message),
        }

        Ok(())
    }
}
