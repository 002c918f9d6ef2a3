//! Test RNG: deterministic `DeterministicRng` implementations for tests.

use questline_core::rng::DeterministicRng;

/// A no-op RNG that always returns `min` for `next_u32_range`. Suitable for
/// tests that do not depend on specific random values.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns values from a predetermined sequence and records the
/// bounds it was asked for. Panics if the sequence is exhausted.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
    requested: Vec<(u32, u32)>,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            index: 0,
            requested: Vec::new(),
        }
    }

    /// Returns every `(min, max)` pair passed to `next_u32_range` so far.
    #[must_use]
    pub fn requested_ranges(&self) -> &[(u32, u32)] {
        &self.requested
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.requested.push((min, max));
        let val = self.values[self.index];
        self.index += 1;
        val
    }
}
