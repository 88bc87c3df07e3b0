//! Decisions and continuations.
//!
//! When executing an action or effect needs a choice only a player can make,
//! execution stops. A [`PendingDecision`] describing the question and a
//! [`Continuation`] describing how to resume are stored together on the
//! snapshot as a [`Pending`]. The only action accepted until then is a
//! `SubmitDecision` echoing the decision's id (or a concession).
//!
//! ## Lifecycle
//!
//! 1. A step returns "suspend"; the engine allocates a `DecisionId`, stores
//!    the pair and emits `DecisionRequested`
//! 2. The response is validated against the stored bounds; an invalid one is
//!    rejected and the snapshot is unchanged
//! 3. The pair is removed, the continuation runs with the response and may
//!    suspend again with a fresh decision

pub mod continuation;
pub mod pending;
pub mod response;

use serde::{Deserialize, Serialize};

pub use continuation::{
    ActivationProgress, CastProgress, Completion, Continuation, DamageProgress, TriggerPlacement,
};
pub use pending::{DamageSlot, DecisionId, DecisionKind, PendingDecision, TargetSlot};
pub use response::DecisionResponse;

/// A decision paired with the continuation that consumes its answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pending {
    pub decision: PendingDecision,
    pub continuation: Continuation,
}
