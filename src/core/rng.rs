//! Deterministic random number generation stored as plain data.
//!
//! The snapshot never holds a live generator. It holds a [`GameRngState`]
//! (seed + stream counter); every randomized operation rebuilds a ChaCha8
//! generator on the next stream, uses it, and writes the advanced state back.
//! Two snapshots with equal `GameRngState` therefore shuffle identically,
//! including after a serialization round trip.
//!
//! ```
//! use ccg_rules::core::GameRngState;
//!
//! let rng = GameRngState::new(42);
//! let (mut a, mut b) = (vec![1, 2, 3, 4, 5, 6, 7, 8], vec![1, 2, 3, 4, 5, 6, 7, 8]);
//! let next_a = rng.shuffle(&mut a);
//! let next_b = rng.shuffle(&mut b);
//! assert_eq!(a, b);
//! assert_eq!(next_a, next_b);
//! assert_ne!(next_a, rng);
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Live ChaCha8 generator bound to one stream of a seed.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    /// Generator for `stream` of `seed`.
    #[must_use]
    pub fn new(seed: u64, stream: u64) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(seed);
        inner.set_stream(stream);
        Self { inner }
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}

/// Serializable RNG position: the seed and the next unused stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed.
    pub seed: u64,
    /// Next stream to hand out.
    pub stream: u64,
}

impl GameRngState {
    /// Fresh state for a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Take the generator for the next stream, returning it with the advanced state.
    #[must_use]
    pub fn next_rng(self) -> (GameRng, GameRngState) {
        let rng = GameRng::new(self.seed, self.stream);
        (
            rng,
            GameRngState {
                seed: self.seed,
                stream: self.stream.wrapping_add(1),
            },
        )
    }

    /// Shuffle a slice with the next stream, returning the advanced state.
    #[must_use]
    pub fn shuffle<T>(self, slice: &mut [T]) -> GameRngState {
        let (mut rng, next) = self.next_rng();
        rng.shuffle(slice);
        next
    }
}
