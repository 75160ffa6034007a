//! pixelveil - Hide sealed messages in pixel LSBs
//!
//! A CLI tool for LSB steganography with authenticated encryption.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CapacityCommand, CommandExecutor, DecodeCommand, EncodeCommand, KeygenCommand};

/// pixelveil - Hide sealed messages in pixel LSBs
///
/// Messages are checksummed, encrypted with ChaCha20Poly1305 and written
/// one bit per channel byte into a lossless image.
#[derive(Parser)]
#[command(name = "pixelveil")]
#[command(version)]
#[command(about = "LSB steganography with authenticated encryption")]
#[command(long_about = None)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key file
    Keygen(KeygenCommand),

    /// Hide a message in an image
    Encode(EncodeCommand),

    /// Recover a hidden message from an image
    Decode(DecodeCommand),

    /// Show how much an image can carry
    Capacity(CapacityCommand),
}

impl Commands {
    fn executor(&self) -> &dyn CommandExecutor {
        match self {
            Commands::Keygen(cmd) => cmd,
            Commands::Encode(cmd) => cmd,
            Commands::Decode(cmd) => cmd,
            Commands::Capacity(cmd) => cmd,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    cli.command.executor().execute()
}
