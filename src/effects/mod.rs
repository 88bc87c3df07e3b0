//! Effect system for card scripts.
//!
//! - `Effect`: plain-data script nodes
//! - `TargetFilter` / `TargetRequirement`: what may be targeted
//! - `EffectRegistry`: kind -> handler dispatch, open for registration
//! - `EffectWork`: a script in progress, storable in a continuation
//!
//! ## Execution
//!
//! The driver in `resolver` pops one node at a time and runs its handler.
//! Handlers return `Done`, `Expand` (control effects queue their children)
//! or `Suspend` (a player must choose). Nothing about an in-flight script
//! lives on the call stack between two actions.

mod effect;
mod handlers;
mod registry;
pub(crate) mod resolver;
mod targeting;
mod work;

pub use effect::{Amount, Effect, EffectKind, EffectTarget, Mode};
pub use handlers::{fixed_targets, sacrifice_candidates};
pub use registry::{EffectHandler, EffectRegistry, EffectStep, Suspension};
pub use targeting::{
    forced_targets, has_legal_assignment, legal_targets, still_legal, target_choice,
    validate_targets, TargetChoice, TargetFilter, TargetRequirement,
};
pub use work::{EffectContext, EffectWork, Memo, WorkItem};
