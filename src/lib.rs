//! # ccg-rules
//!
//! A deterministic rules core for a two-to-eight player trading card game.
//!
//! ## Design Principles
//!
//! 1. **Immutable Snapshots**: A [`GameState`] is never modified. Every
//!    accepted action produces a new snapshot; old ones stay valid and share
//!    structure with the new one through `im`.
//!
//! 2. **One Entry Point**: Hosts call [`Engine::process`] with an [`Action`]
//!    and get back a [`Transition`] or a [`RuleViolation`] naming why the
//!    action was rejected.
//!
//! 3. **Suspendable Resolution**: When the rules need a player's choice in
//!    the middle of processing, the snapshot carries a pending decision plus
//!    a serializable continuation. Answering it with
//!    `Action::submit` resumes exactly where processing stopped, even in a
//!    different process.
//!
//! 4. **Seeded Randomness**: Shuffles draw from a ChaCha8 stream stored in
//!    the snapshot, so equal inputs give equal games.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, components, actions, events, configuration, the state store
//! - `zones`: Ordered zone contents
//! - `cards`: Card definitions, catalogs and mana
//! - `effects`: Effect scripts, targeting and their executor
//! - `decision`: Pending decisions, responses and continuations
//! - `stack`: Stack items, priority and resolution
//! - `triggers`: Triggered ability detection and placement
//! - `turn`: Steps and the turn state machine
//! - `combat`: Attack and block declarations, combat damage
//! - `rules`: The `RulesEngine` trait, characteristic projection, state-based actions
//! - `engine`: The action processor

pub mod cards;
pub mod combat;
pub mod core;
pub mod decision;
pub mod effects;
pub mod engine;
pub mod error;
pub mod rules;
pub mod stack;
pub mod triggers;
pub mod turn;
pub mod zones;

pub use crate::core::{
    Action, ActionKind, Component, EntityId, GameConfig, GameEvent, GameState, MulliganRule,
    PlayerId, PlayerMap,
};

pub use crate::cards::{CardCatalog, CardDefinition, CardRegistry, ManaCost, PaymentStrategy};

pub use crate::decision::{DecisionId, DecisionKind, DecisionResponse, PendingDecision};

pub use crate::effects::{Effect, TargetFilter, TargetRequirement};

pub use crate::engine::{Engine, GameSetup, Transition};

pub use crate::error::{RuleViolation, SetupError, SnapshotError};

pub use crate::rules::{GameResult, RulesEngine};

pub use crate::turn::{Phase, Step};

pub use crate::zones::ZonePosition;
