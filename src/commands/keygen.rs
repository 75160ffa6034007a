//! Key generation command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::Args;

use pixelveil::crypto::{derive_from_password, save_key, SymmetricKey};
use pixelveil::{Placement, StegoConfig};

use super::{read_password, CommandExecutor};

/// Generate a new key file.
#[derive(Args, Debug)]
pub struct KeygenCommand {
    /// Output path for the key file
    #[arg(short, long, default_value = "pixelveil.key")]
    pub output: PathBuf,

    /// Environment variable holding the password that protects the key file.
    /// Without it the key is written unprotected.
    #[arg(long)]
    pub password_env: Option<String>,

    /// Derive the key from the password instead of generating a random one.
    /// Prints the salt that `encode --salt` and `decode --salt` use to derive it again.
    #[arg(long, requires = "password_env")]
    pub derive: bool,

    /// Write a config file with permuted placement using this seed
    #[arg(long, requires = "config")]
    pub seed: Option<u64>,

    /// Path of the config file to write when --seed is given
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CommandExecutor for KeygenCommand {
    fn execute(&self) -> Result<()> {
        let password = read_password(self.password_env.as_deref())?;

        let key = match (&password, self.derive) {
            (Some(password), true) => {
                let (key, salt) = derive_from_password(password, None);
                println!("Derivation salt (keep with the password): {}", BASE64.encode(salt.as_bytes()));
                key
            }
            (None, true) => bail!("--derive needs a password"),
            _ => SymmetricKey::generate(),
        };

        save_key(&key, &self.output, password.as_deref())
            .with_context(|| format!("Failed to save key to {}", self.output.display()))?;

        println!("Key generated successfully:");
        println!("  Key file:    {}", self.output.display());
        println!("  Fingerprint: {}", key.fingerprint());
        println!(
            "  Protection:  {}",
            if password.is_some() { "password" } else { "none" }
        );

        if let (Some(seed), Some(config_path)) = (self.seed, &self.config) {
            StegoConfig::with_placement(Placement::Permuted { seed })
                .save(config_path)
                .with_context(|| format!("Failed to save config to {}", config_path.display()))?;
            println!("  Config:      {} (permuted placement)", config_path.display());
            println!();
            println!("Share the config file together with the key: decoding needs the same seed.");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;

    fn help_for(id: &str) -> String {
        let command = KeygenCommand::augment_args(Command::new("keygen"));
        let help = command
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .unwrap_or_default();
        help
    }

    #[test]
    fn test_multiline_help_keeps_sentences() {
        assert!(help_for("password_env").contains("key file. Without it"));
        assert!(help_for("derive").contains("random one. Prints the salt"));
    }
}
