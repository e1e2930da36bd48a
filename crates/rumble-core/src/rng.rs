//! Random number generator abstraction for determinism.
//!
//! In production, this wraps an OS-seeded RNG. In tests, a seeded or
//! scripted implementation is injected so winner selection and encounter
//! pairing are repeatable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over uniform random selection.
pub trait DeterministicRng: Send {
    /// Returns an index in `[0, len)`, each value equally likely.
    ///
    /// Callers never pass `len == 0`.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Production RNG seeded from the operating system.
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Creates an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Creates an RNG with a fixed seed (useful for replays).
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for SystemRng {
    fn next_index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}
