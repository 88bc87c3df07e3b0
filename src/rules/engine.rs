//! The rules engine seam.
//!
//! Hosts (a UI, a network server, a search agent) drive a game through
//! `RulesEngine`:
//! - Whether an action is legal, and why not
//! - What state and events an action produces
//! - Which actions a player could take right now
//! - Whether the game is over

use serde::{Deserialize, Serialize};

use crate::core::{Action, PlayerId};
use crate::core::state::GameState;
use crate::engine::Transition;
use crate::error::RuleViolation;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (everyone left lost at once).
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Draw => false,
        }
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            GameResult::Winner(p) => Some(*p),
            GameResult::Draw => None,
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `process` must be deterministic: equal snapshots and actions give equal
///   transitions
/// - `process` never mutates its input; a rejection leaves the caller with
///   the snapshot it already had
/// - `legal_actions` lists only actions `validate` accepts
pub trait RulesEngine {
    /// Check an action without applying it.
    fn validate(&self, state: &GameState, action: &Action) -> Result<(), RuleViolation>;

    /// Apply an action, producing the next snapshot and the events emitted.
    fn process(&self, state: &GameState, action: &Action) -> Result<Transition, RuleViolation>;

    /// Actions a player can take in this snapshot.
    ///
    /// Returns empty if the player has nothing to do. Choices the engine asks
    /// for through decisions (targets, X) are left open.
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action>;

    /// Returns `Some(result)` if the game has ended, `None` if it continues.
    fn is_terminal(&self, state: &GameState) -> Option<GameResult> {
        state.outcome().cloned()
    }

    // === Convenience Methods ===

    fn is_legal(&self, state: &GameState, action: &Action) -> bool {
        self.validate(state, action).is_ok()
    }

    /// Apply a sequence of actions, stopping at the first rejection.
    fn process_all<'a>(
        &self,
        state: &GameState,
        actions: impl IntoIterator<Item = &'a Action>,
    ) -> Result<GameState, RuleViolation>
    where
        Self: Sized,
    {
        let mut current = state.clone();
        for action in actions {
            current = self.process(&current, action)?.state;
        }
        Ok(current)
    }
}
