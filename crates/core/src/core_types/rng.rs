//! Seedable simulation RNG.
//!
//! Wraps `StdRng` so every random decision in a session (spread chance,
//! candidate positions, timer jitter) draws from one source. Identical seeds
//! with identical inputs produce identical sessions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Random source owned by the simulation coordinator.
#[derive(Debug, Clone)]
pub struct SimRng(StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SimRng {
    /// Create a new `SimRng` seeded from the given `u64` value.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Uniform sample in `[low, high)`; returns `low` for an empty range.
    pub fn range(&mut self, low: f32, high: f32) -> f32 {
        if high > low {
            self.0.random_range(low..high)
        } else {
            low
        }
    }

    /// Bernoulli trial with probability `p` (clamped to `[0, 1]`).
    pub fn chance(&mut self, p: f32) -> bool {
        if p >= 1.0 {
            return true;
        }
        if p <= 0.0 {
            return false;
        }
        self.0.random::<f32>() < p
    }

    /// Uniform index in `0..len`; `None` when `len == 0`.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.0.random_range(0..len))
    }
}
