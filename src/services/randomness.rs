// Random Source
// Injectable uniform randomness for candidate shaping and deformation

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform random source in [0, 1).
///
/// Generation and deformation only ever ask for Bernoulli draws and uniform
/// picks, so tests can pin outcomes by supplying a fixed or scripted source.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Bernoulli draw with probability `p` (values above 1 always fire).
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniformly pick one item; `None` for an empty list.
    fn pick<'a>(&mut self, items: &'a [String]) -> Option<&'a str> {
        if items.is_empty() {
            return None;
        }
        let idx = ((self.next_f64() * items.len() as f64) as usize).min(items.len() - 1);
        Some(items[idx].as_str())
    }
}

/// Adapter over any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible source: the same seed yields the same rewrite.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Always returns the same value. `FixedRandom(0.0)` fires every non-zero
/// probability and picks the first item; `FixedRandom(0.999_999)` fires nothing
/// below certainty.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.clamp(0.0, 0.999_999)
    }
}

/// Never fires a draw below certainty.
pub fn never() -> FixedRandom {
    FixedRandom(0.999_999)
}

/// Fires every draw with non-zero probability, always picking the first item.
pub fn always() -> FixedRandom {
    FixedRandom(0.0)
}
