//! Explicit simulation generator with first-class state snapshots.
//!
//! Estimators draw from a caller-owned [`SimRng`] rather than any ambient
//! generator. A [`RngState`] captured with [`SimRng::snapshot`] can later be
//! put back with [`SimRng::restore`], which is how the moderated-mediation
//! test feeds both re-evaluations the same random sequence (common random
//! numbers).

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Opaque snapshot of a [`SimRng`]'s internal state.
#[derive(Debug, Clone)]
pub struct RngState(Xoshiro256PlusPlus);

/// Pseudorandom generator used for all simulation draws.
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: Xoshiro256PlusPlus,
}

impl SimRng {
    /// Creates a generator from a 64-bit seed.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            inner: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Captures the current state.
    pub fn snapshot(&self) -> RngState {
        RngState(self.inner.clone())
    }

    /// Rewinds the generator to a previously captured state.
    pub fn restore(&mut self, state: &RngState) {
        self.inner = state.0.clone();
    }

    /// Draws from N(mean, sd²).
    pub fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let z: f64 = self.inner.sample(StandardNormal);
        mean + sd * z
    }

    /// Draws uniformly from [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.inner.random::<f64>()
    }
}
