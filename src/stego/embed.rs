//! Writes frame bits into the least significant bits of a pixel buffer.

use log::debug;
use thiserror::Error;

use super::placement::PlacementPlan;

/// Errors that can occur while embedding.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Carrier too small: frame needs {needed} bytes, buffer has {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Placement plan covers {plan} bytes but buffer has {buffer}")]
    PlanMismatch { plan: usize, buffer: usize },
}

/// What an embed call touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedReport {
    /// Buffer positions whose LSB was written.
    pub positions_written: usize,
    /// Positions whose byte value actually changed.
    pub bytes_changed: usize,
}

/// Writes `frame` into `buffer` at the first `frame.len()` positions of `plan`.
///
/// Only the LSB of each selected byte is touched. Capacity is checked before
/// any write, so a failed call leaves the buffer unchanged.
pub fn embed(
    buffer: &mut [u8],
    frame: &[u8],
    plan: &PlacementPlan,
) -> Result<EmbedReport, EmbedError> {
    if plan.len() != buffer.len() {
        return Err(EmbedError::PlanMismatch {
            plan: plan.len(),
            buffer: buffer.len(),
        });
    }
    if frame.len() > buffer.len() {
        return Err(EmbedError::CapacityExceeded {
            needed: frame.len(),
            capacity: buffer.len(),
        });
    }

    let mut bytes_changed = 0;
    for (index, &bit) in plan.iter().zip(frame) {
        let updated = (buffer[index] & 0xFE) | (bit & 1);
        if updated != buffer[index] {
            bytes_changed += 1;
        }
        buffer[index] = updated;
    }

    debug!(
        "Embedded {} bits into {} byte buffer ({} bytes changed)",
        frame.len(),
        buffer.len(),
        bytes_changed
    );

    Ok(EmbedReport {
        positions_written: frame.len(),
        bytes_changed,
    })
}
