//! Placement plans: which buffer bytes carry frame bits, and in what order.
//!
//! - `Sequential`: byte `i` carries bit `i`. Needs no shared state.
//! - `Permuted`: a seeded shuffle of every buffer index. The seed must be
//!   kept with the key, since decoding needs the identical permutation.

use std::ops::Range;
use std::slice;

use hkdf::Hkdf;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// HKDF salt for expanding a placement seed.
pub const SALT_PLACEMENT: &[u8] = b"PIXELVEIL-PLACEMENT-V1";

/// How frame bits are distributed over the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Placement {
    /// Bits go to consecutive bytes from the start of the buffer.
    #[default]
    Sequential,
    /// Bits go to a pseudo-random permutation of the buffer derived from `seed`.
    Permuted { seed: u64 },
}

/// Ordered, duplicate-free indices covering a whole buffer.
///
/// The sequential plan is the identity and stores only its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementPlan {
    order: Order,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Order {
    Identity { len: usize },
    Shuffled { indices: Vec<usize> },
}

impl PlacementPlan {
    /// Builds the plan for a buffer of `len` bytes.
    pub fn new(placement: Placement, len: usize) -> Self {
        match placement {
            Placement::Sequential => Self::sequential(len),
            Placement::Permuted { seed } => Self::permuted(len, seed),
        }
    }

    pub fn sequential(len: usize) -> Self {
        Self {
            order: Order::Identity { len },
        }
    }

    /// The same `len` and `seed` always produce the same permutation.
    pub fn permuted(len: usize, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::from_seed(derive_seed(seed));
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(&mut rng);
        Self {
            order: Order::Shuffled { indices },
        }
    }

    /// Buffer indices in placement order.
    pub fn iter(&self) -> PlanIter<'_> {
        match &self.order {
            Order::Identity { len } => PlanIter::Identity(0..*len),
            Order::Shuffled { indices } => PlanIter::Shuffled(indices.iter()),
        }
    }

    pub fn len(&self) -> usize {
        match &self.order {
            Order::Identity { len } => *len,
            Order::Shuffled { indices } => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator over a plan's buffer indices.
#[derive(Debug, Clone)]
pub enum PlanIter<'a> {
    Identity(Range<usize>),
    Shuffled(slice::Iter<'a, usize>),
}

impl Iterator for PlanIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            Self::Identity(range) => range.next(),
            Self::Shuffled(iter) => iter.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Identity(range) => range.size_hint(),
            Self::Shuffled(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for PlanIter<'_> {}

/// Derives a 32-byte RNG seed from a placement seed using HKDF-SHA256.
fn derive_seed(seed: u64) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(SALT_PLACEMENT), &seed.to_le_bytes());
    let mut output = [0u8; 32];
    hk.expand(b"seed", &mut output)
        .expect("HKDF expand should not fail");
    output
}
