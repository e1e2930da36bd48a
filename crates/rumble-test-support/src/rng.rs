//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use rumble_core::rng::DeterministicRng;

/// An RNG that always returns index `0`. Suitable for tests that do not
/// depend on specific random values.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// An RNG that returns indices from a predetermined sequence, clamped into
/// range. Once the sequence is exhausted it keeps returning `0`.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<usize>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_index(&mut self, len: usize) -> usize {
        let value = self.values.get(self.index).copied().unwrap_or(0);
        self.index += 1;
        value.min(len.saturating_sub(1))
    }
}
