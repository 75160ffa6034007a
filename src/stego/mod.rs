//! LSB steganography over flat pixel buffers.
//!
//! - `frame`: bytes to bits plus the end-of-frame delimiter
//! - `placement`: sequential or seeded-permutation bit placement
//! - `embed` / `extract`: writing and reading LSBs along a plan
//! - `image`: loading and saving carriers through the `image` crate

pub mod embed;
pub mod extract;
pub mod frame;
pub mod image;
pub mod placement;

pub use embed::{embed, EmbedError, EmbedReport};
pub use extract::{extract, read_lsbs, ExtractError, Extraction, MAX_DELIMITER_CANDIDATES};
pub use frame::{frame_bit_len, from_bits, to_bits, DELIMITER, MIN_FRAME_BITS};
pub use self::image::{ImageCarrier, ImageCarrierError};
pub use placement::{Placement, PlacementPlan, PlanIter};
