//! Reads frame bits back out of a pixel buffer.
//!
//! The LSB stream is read in plan order and scanned for the delimiter.
//! Only byte-aligned matches at or after [`MIN_FRAME_BITS`] are candidates:
//! anything earlier cannot end a real frame. Ciphertext can still contain
//! the pattern by chance, so candidates are reported in order and the
//! caller decides which one authenticates. At most
//! [`MAX_DELIMITER_CANDIDATES`] are collected, which keeps decoding linear in
//! the buffer size even when the LSB stream repeats the delimiter.

use log::{debug, warn};
use thiserror::Error;

use super::frame::{DELIMITER, MIN_FRAME_BITS};
use super::placement::PlacementPlan;

/// Upper bound on delimiter candidates collected from one buffer.
///
/// A chance match occurs about once per 64 KiB of ciphertext, so a real frame
/// is preceded by this many false candidates only for messages of several
/// megabytes.
pub const MAX_DELIMITER_CANDIDATES: usize = 64;

/// Errors that can occur while extracting.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No hidden message found")]
    NoHiddenMessage,

    #[error("Placement plan covers {plan} bytes but buffer has {buffer}")]
    PlanMismatch { plan: usize, buffer: usize },
}

/// The LSB stream of a buffer and the delimiter positions found in it.
#[derive(Debug, Clone)]
pub struct Extraction {
    bits: Vec<u8>,
    candidates: Vec<usize>,
}

impl Extraction {
    /// Bits preceding the first delimiter candidate.
    pub fn frame_bits(&self) -> &[u8] {
        &self.bits[..self.candidates[0]]
    }

    /// Bits preceding each delimiter candidate, earliest first.
    pub fn candidates(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.candidates.iter().map(move |&end| &self.bits[..end])
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

/// Reads one LSB per buffer byte, in plan order.
pub fn read_lsbs(buffer: &[u8], plan: &PlacementPlan) -> Result<Vec<u8>, ExtractError> {
    if plan.len() != buffer.len() {
        return Err(ExtractError::PlanMismatch {
            plan: plan.len(),
            buffer: buffer.len(),
        });
    }
    Ok(plan.iter().map(|i| buffer[i] & 1).collect())
}

/// Scans `buffer` for a delimited frame.
pub fn extract(buffer: &[u8], plan: &PlacementPlan) -> Result<Extraction, ExtractError> {
    let bits = read_lsbs(buffer, plan)?;
    let candidates = find_delimiters(&bits);

    debug!(
        "Scanned {} bits, {} delimiter candidate(s)",
        bits.len(),
        candidates.len()
    );

    if candidates.is_empty() {
        return Err(ExtractError::NoHiddenMessage);
    }
    Ok(Extraction { bits, candidates })
}

fn find_delimiters(bits: &[u8]) -> Vec<usize> {
    if bits.len() < MIN_FRAME_BITS + DELIMITER.len() {
        return Vec::new();
    }
    let candidates: Vec<usize> = (MIN_FRAME_BITS..=bits.len() - DELIMITER.len())
        .step_by(8)
        .filter(|&p| bits[p..p + DELIMITER.len()] == DELIMITER)
        .take(MAX_DELIMITER_CANDIDATES)
        .collect();

    if candidates.len() == MAX_DELIMITER_CANDIDATES {
        warn!(
            "Delimiter candidate limit ({}) reached, later candidates ignored",
            MAX_DELIMITER_CANDIDATES
        );
    }
    candidates
}
