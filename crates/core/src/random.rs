//! Injectable randomness for prize selection.
//!
//! Production uses [`SystemRandom`], backed by the thread-local CSPRNG
//! (ChaCha, reseeded from the OS). Tests inject [`SeededRandom`] or
//! [`FixedDraw`] for deterministic outcomes.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random values.
///
/// Implementations must be shareable across request handlers.
pub trait RandomSource: Send + Sync {
    /// A uniform value in `[0, 1)`.
    fn next_unit(&self) -> f64;

    /// A uniform index in `0..len`. Callers guarantee `len > 0`.
    fn next_index(&self, len: usize) -> usize;
}

/// Non-predictable generator for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn next_unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }

    fn next_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Reproducible generator seeded from a fixed value.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        rng.random::<f64>()
    }

    fn next_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        rng.random_range(0..len)
    }
}

/// Always returns the same draw. `unit` is clamped into `[0, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw {
    pub unit: f64,
    pub index: usize,
}

impl FixedDraw {
    pub fn new(unit: f64) -> Self {
        Self { unit, index: 0 }
    }
}

impl RandomSource for FixedDraw {
    fn next_unit(&self) -> f64 {
        self.unit.clamp(0.0, 1.0 - f64::EPSILON)
    }

    fn next_index(&self, len: usize) -> usize {
        self.index % len
    }
}
