//! Rules: the host-facing engine trait, state-based actions and the
//! effective-characteristics projection.
//!
//! The core engine reads power, toughness and keywords only through a
//! [`Projector`], and reports outcomes as a [`GameResult`].

pub mod engine;
pub mod projection;
pub(crate) mod sba;

pub use engine::{GameResult, RulesEngine};
pub use projection::{BaseProjector, Characteristics, EffectiveView, Projector};
