//! Encode command - hide a message in an image.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use log::info;

use pixelveil::stego::frame_bit_len;
use pixelveil::{encode_with_config, ImageCarrier};

use super::{read_password, resolve_config, resolve_key, CommandExecutor};

/// Hide a message in the least significant bits of an image.
///
/// The output must be a lossless format (PNG or BMP); lossy formats destroy the LSBs.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Carrier image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output image (.png or .bmp)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Message to hide (reads from stdin if not provided)
    #[arg(short, long)]
    pub message: Option<String>,

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

    /// Use permuted placement with this seed (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        if !is_lossless(&self.output) {
            bail!("Output must be .png or .bmp: {}", self.output.display());
        }

        let message = match &self.message {
            Some(m) => m.clone(),
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read message from stdin")?;
                buf
            }
        };

        let password = read_password(self.password_env.as_deref())?;
        let key = resolve_key(self.key.as_deref(), self.salt.as_deref(), password.as_deref())?;
        let config = resolve_config(self.config.as_deref(), self.seed)?;

        let mut carrier = ImageCarrier::from_file(&self.input)
            .with_context(|| format!("Failed to read carrier from {}", self.input.display()))?;

        let needed = frame_bit_len(message.len());
        if needed > carrier.capacity_bits() {
            bail!(
                "Message too long for this image: needs {} channel bytes, image has {}",
                needed,
                carrier.capacity_bits()
            );
        }

        let encoded = encode_with_config(carrier.pixels_mut(), &message, &key, &config)
            .context("Failed to encode message")?;

        carrier
            .save(&self.output)
            .with_context(|| format!("Failed to save image to {}", self.output.display()))?;

        info!("Message encoded and saved to {}", self.output.display());
        println!(
            "Encoded {} bytes ({} bits, {} pixel bytes changed) into {}",
            message.len(),
            encoded.frame_bits,
            encoded.report.bytes_changed,
            self.output.display()
        );

        Ok(())
    }
}

/// True when `path` names a format that preserves every channel bit.
fn is_lossless(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "bmp"))
        .unwrap_or(false)
}
