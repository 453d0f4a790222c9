//! Seeded randomness for games.
//!
//! A game owns one `GameRng` and draws every random decision from it:
//! maze walls, card layouts, question order, balloon spawns. Two sessions
//! built from the same [`SessionConfig`](super::SessionConfig) seed make the
//! same draws in the same order, so a recorded run replays exactly.
//!
//! Sub-systems that should not disturb the main sequence take their own
//! stream with [`GameRng::for_context`]:
//!
//! ```
//! use party_games::core::GameRng;
//!
//! let table = GameRng::new(42);
//! let mut walls = table.for_context("walls");
//! let mut again = GameRng::new(42).for_context("walls");
//! assert_eq!(walls.gen_range(0..100), again.gen_range(0..100));
//! ```

use std::hash::Hasher;
use std::ops::Range;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// ChaCha8 stream tagged with the seed that produced it.
#[derive(Clone, Debug)]
pub struct GameRng {
    seed: u64,
    stream: ChaCha8Rng,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            stream: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A fresh seed for sessions started without one.
    #[must_use]
    pub fn entropy_seed() -> u64 {
        rand::thread_rng().gen()
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Separate stream keyed by `context`.
    ///
    /// Depends only on this generator's seed and the context name, never on
    /// how many values have been drawn so far. Uses `FxHasher` so the derived
    /// seed is stable across toolchains.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write_u64(self.seed);
        hasher.write(context.as_bytes());
        Self::new(hasher.finish())
    }

    pub fn gen_range(&mut self, range: Range<i32>) -> i32 {
        self.stream.gen_range(range)
    }

    pub fn gen_range_i64(&mut self, range: Range<i64>) -> i64 {
        self.stream.gen_range(range)
    }

    pub fn gen_range_usize(&mut self, range: Range<usize>) -> usize {
        self.stream.gen_range(range)
    }

    pub fn gen_range_f64(&mut self, range: Range<f64>) -> f64 {
        self.stream.gen_range(range)
    }

    /// Uniform in `[0, 1)`.
    pub fn gen_f64(&mut self) -> f64 {
        self.stream.gen()
    }

    /// True with chance `probability`, which must lie in `0.0..=1.0`.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.stream.gen_bool(probability)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.stream);
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.stream)
    }

    /// Up to `amount` distinct items in random order.
    pub fn sample<T: Clone>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        items.choose_multiple(&mut self.stream, amount).cloned().collect()
    }

    /// Position in the stream, for saving a game mid-round.
    #[must_use]
    pub fn snapshot(&self) -> RngSnapshot {
        RngSnapshot {
            seed: self.seed,
            word_pos: self.stream.get_word_pos(),
        }
    }

    /// Continue exactly where `snapshot` was taken.
    #[must_use]
    pub fn restore(snapshot: &RngSnapshot) -> Self {
        let mut rng = Self::new(snapshot.seed);
        rng.stream.set_word_pos(snapshot.word_pos);
        rng
    }
}

/// Saved [`GameRng`] position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSnapshot {
    pub seed: u64,
    pub word_pos: u128,
}
