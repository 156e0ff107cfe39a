//! Poll pacing for the append observation loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::config::BackoffConfig;

/// Exponential backoff with full jitter.
///
/// Each delay is drawn uniformly from `[1ms, current]`, after which `current`
/// grows by the multiplier up to the configured maximum.
#[derive(Debug)]
pub struct Backoff {
    current_ms: f64,
    max_ms: f64,
    multiplier: f64,
    rng: StdRng,
}

impl Backoff {
    /// Creates a backoff seeded from the operating system.
    pub fn new(config: &BackoffConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a backoff with a fixed seed, for reproducible pacing.
    pub fn with_seed(config: &BackoffConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &BackoffConfig, rng: StdRng) -> Self {
        Self {
            current_ms: config.initial_ms as f64,
            max_ms: config.max_ms as f64,
            multiplier: config.multiplier,
            rng,
        }
    }

    /// Returns the next delay and advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let upper = (self.current_ms as u64).max(1);
        let delay = self.rng.gen_range(1..=upper);
        self.current_ms = (self.current_ms * self.multiplier).min(self.max_ms);
        Duration::from_millis(delay)
    }

    /// Upper bound of the next delay.
    pub fn ceiling(&self) -> Duration {
        Duration::from_millis(self.current_ms as u64)
    }
}
