//! Synthetic progress indicator
//!
//! The server does not report progress. While a run is in flight each
//! `analyzing` poll nudges the meter forward by a random step, capped below
//! 100 so that only completion fills it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Value shown once a run completes
pub const COMPLETE: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct ProgressMeter {
    value: f64,
    cap: f64,
    step: f64,
    rng: StdRng,
}

impl ProgressMeter {
    pub fn new(cap: f64, step: f64) -> Self {
        Self::with_rng(cap, step, StdRng::from_entropy())
    }

    /// Deterministic increments, for tests
    pub fn with_seed(cap: f64, step: f64, seed: u64) -> Self {
        Self::with_rng(cap, step, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cap: f64, step: f64, rng: StdRng) -> Self {
        Self {
            value: 0.0,
            cap,
            step,
            rng,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance by a random amount in `[0, step)`, never past the cap
    pub fn tick(&mut self) -> f64 {
        let increment = self.rng.gen_range(0.0..self.step);
        self.value = (self.value + increment).min(self.cap);
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn finish(&mut self) -> f64 {
        self.value = COMPLETE;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_stay_under_cap() {
        let mut meter = ProgressMeter::with_seed(90.0, 10.0, 7);
        let mut previous = meter.value();
        for _ in 0..200 {
            let value = meter.tick();
            assert!(value >= previous);
            assert!((0.0..=90.0).contains(&value));
            previous = value;
        }
        assert!((meter.value() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_and_finish() {
        let mut meter = ProgressMeter::with_seed(90.0, 10.0, 1);
        meter.tick();
        meter.tick();
        meter.reset();
        assert!(meter.value().abs() < f64::EPSILON);
        assert!((meter.finish() - COMPLETE).abs() < f64::EPSILON);
    }
}
