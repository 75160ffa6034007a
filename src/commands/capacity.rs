//! Capacity command - how much text an image can carry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixelveil::ImageCarrier;

use super::CommandExecutor;

/// Show how large a message an image can carry.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Carrier image
    #[arg(short, long)]
    pub input: PathBuf,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self) -> Result<()> {
        let carrier = ImageCarrier::from_file(&self.input)
            .with_context(|| format!("Failed to read image from {}", self.input.display()))?;
        let (width, height) = carrier.dimensions();

        println!("Image:          {} ({}x{})", self.input.display(), width, height);
        println!("Channel bytes:  {}", carrier.capacity_bits());
        match carrier.max_message_len() {
            Some(len) => println!("Max message:    {} bytes", len),
            None => println!("Max message:    image too small for any message"),
        }

        Ok(())
    }
}
