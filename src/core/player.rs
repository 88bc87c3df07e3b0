//! Player identification, turn order and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe seat index supporting 2-8 players.
//!
//! ## PlayerMap
//!
//! Per-player data backed by an `im::Vector`, so cloning a snapshot that
//! contains one is O(1) and indexing by `PlayerId` is cheap.

use im::Vector;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Seat index of a player. Seat 0 sits first in turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seats of a `player_count` game.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// The seat after this one, wrapping around the table.
    #[must_use]
    pub fn next_seat(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count) as u8)
    }

    /// Seats in APNAP order: `active` first, then clockwise.
    ///
    /// ```
    /// use ccg_rules::core::PlayerId;
    ///
    /// let order: Vec<_> = PlayerId::apnap(PlayerId::new(2), 4).collect();
    /// assert_eq!(order, vec![PlayerId(2), PlayerId(3), PlayerId(0), PlayerId(1)]);
    /// ```
    pub fn apnap(active: PlayerId, player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(move |offset| PlayerId(((active.index() + offset) % player_count) as u8))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data, one entry per seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMap<T: Clone> {
    data: Vector<T>,
}

impl<T: Clone> PlayerMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            data: PlayerId::all(player_count).map(factory).collect(),
        }
    }

    /// Create a map with every seat set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self {
        Self::new(player_count, |_| value.clone())
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// A player's entry.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Mutable access, copying the shared chunk on first write.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Replace a player's entry, returning the updated map.
    #[must_use]
    pub fn with(&self, player: PlayerId, value: T) -> Self {
        Self {
            data: self.data.update(player.index(), value),
        }
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T: Clone> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}
