//! Game configuration.
//!
//! Rules parameters a host picks before the game starts. The configuration is
//! stored inside every snapshot so a restored game carries its own rules.

use serde::{Deserialize, Serialize};

/// Mulligan procedure used during setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MulliganRule {
    /// Shuffle back, draw a full hand, bottom one card per mulligan taken.
    London,
    /// Opening hands are kept as drawn.
    None,
}

/// Complete rules configuration.
///
/// ```
/// use ccg_rules::core::GameConfig;
///
/// let config = GameConfig::new(2).with_starting_life(30).with_seed(7);
/// assert_eq!(config.starting_life, 30);
/// assert_eq!(config.max_hand_size, 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players (2-8).
    pub player_count: usize,

    /// Life total each player starts with.
    pub starting_life: i64,

    /// Cards drawn for the opening hand.
    pub starting_hand_size: usize,

    /// Hand size enforced during cleanup.
    pub max_hand_size: usize,

    /// Lands a player may play each turn.
    pub lands_per_turn: u32,

    /// The starting player skips the draw on the first turn of the game.
    pub skip_first_draw: bool,

    /// Seed for the deterministic RNG.
    pub seed: u64,

    /// Mulligan procedure.
    pub mulligan: MulliganRule,
}

impl GameConfig {
    /// Default rules for `player_count` players.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        assert!(
            (2..=8).contains(&player_count),
            "Player count must be 2-8"
        );

        Self {
            player_count,
            starting_life: 20,
            starting_hand_size: 7,
            max_hand_size: 7,
            lands_per_turn: 1,
            skip_first_draw: true,
            seed: 0,
            mulligan: MulliganRule::London,
        }
    }

    #[must_use]
    pub fn with_starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_lands_per_turn(mut self, lands: u32) -> Self {
        self.lands_per_turn = lands;
        self
    }

    #[must_use]
    pub fn with_skip_first_draw(mut self, skip: bool) -> Self {
        self.skip_first_draw = skip;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_mulligan(mut self, rule: MulliganRule) -> Self {
        self.mulligan = rule;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(2)
    }
}
