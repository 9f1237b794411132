//! Randomness adapters.

use crate::assignment::{domain::UserId, ports::RandomSource};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::sync::{Mutex, PoisonError};

/// Shuffles with the calling thread's random generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn shuffle(&self, ids: &mut [UserId]) {
        ids.shuffle(&mut rand::thread_rng());
    }
}

/// Reproducible shuffles from a fixed seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Creates a generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn shuffle(&self, ids: &mut [UserId]) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        ids.shuffle(&mut *rng);
    }
}
