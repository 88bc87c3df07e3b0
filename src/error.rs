//! Error types.
//!
//! `RuleViolation` is the player-facing rejection: the action was illegal and
//! the state is unchanged. Its `Display` text is the reason handed back to the
//! caller. Engine bugs are not errors; they go through [`contract_violation`].

use thiserror::Error;

use crate::core::{ActionTag, EntityId, PlayerId};
use crate::decision::DecisionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("The game is over")]
    GameOver,

    #[error("Decision {0} is pending; only a matching response is accepted")]
    DecisionPending(DecisionId),

    #[error("No decision is pending")]
    NoPendingDecision,

    #[error("Response is for decision {got}, but decision {expected} is pending")]
    DecisionMismatch { expected: DecisionId, got: DecisionId },

    #[error("{player} cannot answer decision {decision}; it belongs to {owner}")]
    WrongDecisionPlayer {
        decision: DecisionId,
        player: PlayerId,
        owner: PlayerId,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0} does not have priority")]
    NotYourPriority(PlayerId),

    #[error("{player} has lost the game")]
    PlayerOut { player: PlayerId },

    #[error("Wrong timing: {0}")]
    WrongTiming(String),

    #[error("Cannot pay: {0}")]
    CannotPay(String),

    #[error("Illegal target {target} in slot {slot}")]
    IllegalTarget { slot: usize, target: EntityId },

    #[error("Wrong number of targets: {0}")]
    TargetCount(String),

    #[error("{0} is not in your hand")]
    NotInHand(EntityId),

    #[error("{0} is not a permanent you control")]
    NotYourPermanent(EntityId),

    #[error("Unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("Card '{0}' is not in the catalog")]
    UnknownCard(String),

    #[error("{0} is not a land")]
    NotALand(EntityId),

    #[error("{0} is a land and cannot be cast")]
    LandNotCastable(EntityId),

    #[error("You cannot play more lands this turn")]
    LandLimit,

    #[error("{source_id} has no ability {index}")]
    NoSuchAbility { source_id: EntityId, index: usize },

    #[error("{0} is tapped")]
    Tapped(EntityId),

    #[error("{0} has summoning sickness")]
    SummoningSick(EntityId),

    #[error("Not enough permanents to sacrifice")]
    CannotSacrifice,

    #[error("Invalid attack: {0}")]
    InvalidAttack(String),

    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    #[error("Invalid blocker order: {0}")]
    InvalidBlockerOrder(String),

    #[error("Mulligan: {0}")]
    Mulligan(String),

    #[error("No handler registered for {0}")]
    NoHandler(ActionTag),
}

/// Errors persisting or restoring a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot encoding failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Snapshot is inconsistent: {0}")]
    Inconsistent(String),
}

/// Errors building the opening state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Card '{0}' is not in the catalog")]
    UnknownCard(String),

    #[error("Expected {expected} decks, got {got}")]
    DeckCount { expected: usize, got: usize },

    #[error("Deck for {player} has {size} cards, fewer than an opening hand of {hand}")]
    DeckTooSmall {
        player: PlayerId,
        size: usize,
        hand: usize,
    },
}

pub type Result<T> = std::result::Result<T, RuleViolation>;

/// Abort on a broken engine invariant.
///
/// Used for states player input can never produce, such as resuming a
/// continuation with no decision pending. These are bugs, not rejections.
#[cold]
#[track_caller]
pub fn contract_violation(what: impl std::fmt::Display) -> ! {
    panic!("engine contract violated: {}", what)
}
