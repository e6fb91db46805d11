// src/simulation/rng.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};

/// Seeded random source shared by demand generation and lead-time draws.
///
/// The same seed always yields the same sequence for a given build of the
/// `rand` stack. Degenerate spreads (non-positive or non-finite sigma) fall
/// back to the location parameter instead of failing.
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: StdRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform integer in [low, high], both inclusive.
    pub fn int_range(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    pub fn gaussian(&mut self, mu: f64, sigma: f64) -> f64 {
        if !(sigma.is_finite() && sigma > 0.0) {
            return mu;
        }
        match Normal::new(mu, sigma) {
            Ok(normal) => normal.sample(&mut self.inner),
            Err(_) => mu,
        }
    }

    /// Draw from a log-normal whose underlying normal has mean `mu` and std `sigma`.
    pub fn log_normal(&mut self, mu: f64, sigma: f64) -> f64 {
        if !(sigma.is_finite() && sigma > 0.0) {
            return mu.exp();
        }
        match LogNormal::new(mu, sigma) {
            Ok(dist) => dist.sample(&mut self.inner),
            Err(_) => mu.exp(),
        }
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.int_range(0, items.len() as i64 - 1) as usize;
        items.get(idx)
    }
}
