//! Test RNG — scripted `DeterministicRng` implementations for tests.

use ed4e_core::rng::DeterministicRng;

/// An RNG that always returns `min`, so every die shows a natural 1.
/// Suitable for tests that do not depend on specific faces, and for
/// provoking the Rule of One.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns die faces from a predetermined sequence, one per
/// die rolled (explosions included). Panics if the sequence is exhausted
/// or a scripted face is out of range for the die being rolled.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }

    /// Number of values consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.index
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let val = self.values[self.index];
        assert!(
            (min..=max).contains(&val),
            "scripted value {val} outside [{min}, {max}] at position {}",
            self.index
        );
        self.index += 1;
        val
    }
}
