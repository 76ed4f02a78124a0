//! Per-item random generators.
//!
//! Workers never share a random source. Each work item derives its own
//! [`StdRng`] from the run seed, the phase it belongs to, and its index:
//!
//! ```text
//! seed = SHA-256(run_seed ‖ phase tag ‖ index)
//! ```
//!
//! Content sizes and section assignments are therefore a pure function of
//! `(seed, phase, index)`, independent of worker count and scheduling order.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// The two sequential phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Sections,
    Pages,
}

impl Phase {
    fn tag(self) -> &'static [u8] {
        match self {
            Phase::Sections => b"section",
            Phase::Pages => b"page",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Sections => write!(f, "sections"),
            Phase::Pages => write!(f, "pages"),
        }
    }
}

/// Random generator owned by a single work item.
pub fn item_rng(run_seed: u64, phase: Phase, index: usize) -> StdRng {
    let mut hasher = Sha256::new();
    hasher.update(run_seed.to_le_bytes());
    hasher.update(phase.tag());
    hasher.update((index as u64).to_le_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    StdRng::from_seed(digest)
}
