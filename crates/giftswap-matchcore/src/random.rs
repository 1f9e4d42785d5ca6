//! Injectable sources of uniform integer draws.
//!
//! The matcher only ever needs "pick an index in `[0, bound)`", so that is
//! the whole trait. Production code uses [`RngSource`] over a `StdRng`;
//! tests seed it or script the exact draws.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Supplies unbiased integer draws.
pub trait RandomSource {
    /// Uniform draw from `[0, bound)`. Callers guarantee `bound > 0`.
    fn draw(&mut self, bound: usize) -> usize;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn draw(&mut self, bound: usize) -> usize {
        (**self).draw(bound)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn draw(&mut self, bound: usize) -> usize {
        (**self).draw(bound)
    }
}

/// [`RandomSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R = StdRng> {
    rng: R,
}

impl RngSource<StdRng> {
    /// OS-entropy seeded generator for production use.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixed-seed generator; the same seed replays the same draws.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RngSource<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn draw(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

/// Replays a fixed list of draws, then falls back to a seeded generator.
///
/// Each scripted value is reduced modulo `bound`, so a script can be written
/// without knowing the candidate counts in advance.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug)]
pub struct ScriptedSource {
    script: std::collections::VecDeque<usize>,
    fallback: RngSource,
    draws: usize,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: RngSource::seeded(0),
            draws: 0,
        }
    }

    /// Total draws served so far (scripted and fallback).
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Scripted draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl RandomSource for ScriptedSource {
    fn draw(&mut self, bound: usize) -> usize {
        self.draws += 1;
        match self.script.pop_front() {
            Some(next) => next % bound,
            None => self.fallback.draw(bound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_bounds() {
        let mut rng = RngSource::seeded(7);
        for bound in 1..50 {
            for _ in 0..20 {
                assert!(rng.draw(bound) < bound);
            }
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        let xs: Vec<usize> = (0..32).map(|_| a.draw(1000)).collect();
        let ys: Vec<usize> = (0..32).map(|_| b.draw(1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn bound_of_one_always_zero() {
        let mut rng = RngSource::from_entropy();
        assert!((0..100).all(|_| rng.draw(1) == 0));
    }

    #[test]
    fn scripted_source_replays_then_falls_back() {
        let mut src = ScriptedSource::new([1, 5, 0]);
        assert_eq!(src.draw(2), 1);
        assert_eq!(src.draw(3), 2); // 5 % 3
        assert_eq!(src.draw(4), 0);
        assert_eq!(src.remaining(), 0);
        assert!(src.draw(10) < 10);
        assert_eq!(src.draws(), 4);
    }

    #[test]
    fn boxed_source_delegates() {
        let mut boxed: Box<dyn RandomSource + Send> = Box::new(ScriptedSource::new([3]));
        assert_eq!(boxed.draw(10), 3);
    }
}
