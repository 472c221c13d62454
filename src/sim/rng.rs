//! Seeded randomness for simulations

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic RNG; two games built from the same seed roll identically
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform in [0, 1)
    pub fn unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Uniform in [min, max); returns `min` for an empty range
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + self.unit() * (max - min)
    }

    /// Uniform integer in [min, max] inclusive; returns `min` if `max < min`
    pub fn int_inclusive(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..=max)
    }

    /// Uniform index into a collection of `len` items
    pub fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.random_range(0..len)
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Symmetric jitter in [-spread/2, spread/2)
    pub fn jitter(&mut self, spread: f32) -> f32 {
        (self.unit() - 0.5) * spread
    }
}
