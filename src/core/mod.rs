//! Core engine types: entities, components, players, state, actions, events,
//! RNG and configuration.
//!
//! Everything in here is plain data. Rules live in the subsystem modules and
//! operate on these types.

pub mod action;
pub mod component;
pub mod config;
pub mod entity;
pub mod event;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionKind, ActionRecord, ActionTag};
pub use component::{Component, ComponentKind, Components, CounterKind};
pub use config::{GameConfig, MulliganRule};
pub use entity::EntityId;
pub use event::{GameEvent, LossReason};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{GameState, MulliganState, PlayerState, TurnState};
