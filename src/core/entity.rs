//! Entity identification.
//!
//! Every game object (player, card, token, stack item) has a unique `EntityId`.
//! Entities carry no behavior; everything known about them lives in their
//! attached [`Components`](super::Components).
//!
//! ## ID Layout
//!
//! - `0..player_count`: reserved for players
//! - `player_count..`: cards, tokens and stack items, allocated by the state
//!
//! ```
//! use ccg_rules::core::{EntityId, PlayerId};
//!
//! let player = EntityId::player(PlayerId::new(1));
//! assert!(player.is_player(2));
//! assert_eq!(player.as_player(2), Some(PlayerId::new(1)));
//!
//! let card = EntityId(10);
//! assert!(!card.is_player(2));
//! ```

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Unique identifier for any game entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// First id available for non-player entities.
    #[must_use]
    pub const fn first_non_player(player_count: usize) -> u32 {
        player_count as u32
    }

    /// Entity id of a player.
    #[must_use]
    pub const fn player(id: PlayerId) -> Self {
        Self(id.0 as u32)
    }

    /// Does this id denote a player in a game of `player_count` players?
    #[must_use]
    pub const fn is_player(self, player_count: usize) -> bool {
        self.0 < player_count as u32
    }

    /// Convert to a `PlayerId` if this is a player entity.
    #[must_use]
    pub fn as_player(self, player_count: usize) -> Option<PlayerId> {
        if self.is_player(player_count) {
            Some(PlayerId::new(self.0 as u8))
        } else {
            None
        }
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<PlayerId> for EntityId {
    fn from(player: PlayerId) -> Self {
        Self::player(player)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_layout() {
        assert!(EntityId(0).is_player(2));
        assert!(EntityId(1).is_player(2));
        assert!(!EntityId(2).is_player(2));
        assert!(EntityId(2).is_player(3));
        assert_eq!(EntityId::first_non_player(4), 4);
    }

    #[test]
    fn test_as_player() {
        assert_eq!(EntityId(1).as_player(2), Some(PlayerId::new(1)));
        assert_eq!(EntityId(5).as_player(2), None);
        assert_eq!(EntityId::from(PlayerId::new(3)), EntityId(3));
    }

    #[test]
    fn test_ordering_is_numeric() {
        let mut ids = vec![EntityId(9), EntityId(2), EntityId(5)];
        ids.sort();
        assert_eq!(ids, vec![EntityId(2), EntityId(5), EntityId(9)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId(42)), "#42");
    }
}
