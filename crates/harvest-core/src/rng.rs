//! Probability sampling
//!
//! Every random decision in a harvest goes through the [`Sampler`] trait, which
//! yields normalized draws in `[0, 1)`. Three sources implement it:
//!
//! - [`GameRng`]: xorshift64, seedable, identical sequences on every platform
//! - [`ScriptedSampler`]: replays a fixed list of draws (scenario tests, tooling)
//! - [`SharedSampler`]: a mutex-guarded [`GameRng`] for callers that share one
//!   source across threads and do not need per-node reproducibility

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

/// Largest `f64` strictly below 1.0
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// A source of uniform draws in `[0, 1)`
pub trait Sampler {
    /// Draw the next uniform value in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// Bernoulli trial: one draw, succeeds when it falls below `probability`
    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }

    /// Uniform integer in `[min, max]` inclusive, from exactly one draw
    ///
    /// A reversed range is treated as the single value `min`.
    fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        let draw = self.next_unit();
        if max <= min {
            return min;
        }
        let span = (max as i128 - min as i128 + 1) as f64;
        let offset = (draw * span).floor() as i128;
        (min as i128 + offset).min(max as i128) as i64
    }
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// A deterministic random number generator
///
/// Uses xorshift64 for simplicity and reproducibility.
/// Never use thread-local or OS randomness in harvest logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift state must be non-zero
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create an RNG from a saved state
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// Get the current state (useful for saving/loading)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random f64 in range [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        // top 53 bits so the result is exactly representable and never rounds up to 1.0
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

impl Sampler for GameRng {
    fn next_unit(&mut self) -> f64 {
        self.next_f64()
    }
}

/// Replays a fixed sequence of normalized draws
///
/// Values are clamped into `[0, 1)`. Once the script is exhausted it starts over;
/// an empty script always yields `0.0`. A sampler built with
/// [`ScriptedSampler::strict`] panics instead, so a scenario that takes more
/// draws than it scripted fails loudly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSampler {
    draws: Vec<f64>,
    cursor: usize,
    taken: usize,
    strict: bool,
}

impl ScriptedSampler {
    /// Create a sampler that yields `draws` in order, cycling
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            cursor: 0,
            taken: 0,
            strict: false,
        }
    }

    /// Create a sampler that yields `draws` exactly once each
    ///
    /// # Panics
    ///
    /// Drawing past the end of the script panics.
    pub fn strict(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            strict: true,
            ..Self::new(draws)
        }
    }

    /// Whether every scripted draw has been consumed at least once
    pub fn is_exhausted(&self) -> bool {
        self.taken >= self.draws.len()
    }

    /// Total number of draws consumed so far
    pub fn draws_taken(&self) -> usize {
        self.taken
    }
}

impl Sampler for ScriptedSampler {
    fn next_unit(&mut self) -> f64 {
        if self.strict && self.taken >= self.draws.len() {
            panic!(
                "scripted sampler exhausted after {} draws",
                self.draws.len()
            );
        }
        self.taken += 1;
        if self.draws.is_empty() {
            return 0.0;
        }
        let value = self.draws[self.cursor];
        self.cursor = (self.cursor + 1) % self.draws.len();
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, BELOW_ONE)
    }
}

/// A [`GameRng`] shareable across threads
///
/// Lock it once per harvest event so one event's draws are never interleaved
/// with another's.
#[derive(Debug, Default)]
pub struct SharedSampler {
    rng: Mutex<GameRng>,
}

impl SharedSampler {
    /// Create a shared sampler with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(GameRng::new(seed)),
        }
    }

    /// Take exclusive access for a batch of draws
    pub fn lock(&self) -> MutexGuard<'_, GameRng> {
        self.rng.lock()
    }

    /// Run `f` with exclusive access to the underlying RNG
    pub fn with<R>(&self, f: impl FnOnce(&mut GameRng) -> R) -> R {
        f(&mut self.rng.lock())
    }
}
