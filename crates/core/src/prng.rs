//! Seedable randomness for the search.
//!
//! The only stochastic step of the solver is the ±1 perturbation direction
//! drawn per dimension per iteration. It is read through the [`SignSource`]
//! trait so callers can pass a seeded [`Xorshift64`] for reproducible solves
//! or a scripted source in tests.

use serde::{Deserialize, Serialize};

/// Source of uniformly random ±1 perturbation signs.
pub trait SignSource {
    /// Returns `1.0` or `-1.0` with equal probability.
    fn next_sign(&mut self) -> f64;
}

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the standard shift parameters (13, 7, 17). Seed of 0 is replaced
/// with a non-zero fallback to avoid the all-zeros fixed point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Fallback seed used when the caller provides 0.
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    ///
    /// Uses the upper 53 bits of `next_u64()` divided by 2^53.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl SignSource for Xorshift64 {
    fn next_sign(&mut self) -> f64 {
        if self.next_f64() > 0.5 {
            1.0
        } else {
            -1.0
        }
    }
}

impl<S: SignSource + ?Sized> SignSource for &mut S {
    fn next_sign(&mut self) -> f64 {
        (**self).next_sign()
    }
}
