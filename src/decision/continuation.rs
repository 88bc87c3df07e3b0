//! Continuations: how to resume once a pending decision is answered.
//!
//! Each variant carries only ids and plain script data, never references
//! into the state, so a paused game is a plain value that can be stored,
//! sent elsewhere and resumed by a different process.

use serde::{Deserialize, Serialize};

use crate::cards::PaymentStrategy;
use crate::core::{EntityId, PlayerId};
use crate::effects::{Effect, EffectWork, Memo};

/// What happens after an effect script finishes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// The resolving stack item leaves the stack.
    StackItem(EntityId),
    /// Nothing further (mana abilities).
    Immediate,
}

/// A spell on its way onto the stack. The card is already on the stack;
/// choices still `None` are asked for in order: X, then targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastProgress {
    pub card: EntityId,
    pub player: PlayerId,
    pub x: Option<u32>,
    pub targets: Option<Vec<Vec<EntityId>>>,
    pub payment: PaymentStrategy,
}

/// An ability being activated. Sacrifice costs are chosen and paid before
/// targets are chosen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationProgress {
    pub source: EntityId,
    pub ability: usize,
    pub player: PlayerId,
    /// Permanents already sacrificed for the cost.
    pub sacrificed: Option<Vec<EntityId>>,
    pub targets: Option<Vec<Vec<EntityId>>>,
}

/// Triggered abilities already on the stack that still need an order or targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPlacement {
    /// Per controller, abilities put on the stack together that the
    /// controller must order.
    pub order_groups: Vec<Vec<EntityId>>,
    /// Abilities waiting for targets, in the order they are asked.
    pub targeting: Vec<EntityId>,
}

/// Combat damage being assigned for one step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageProgress {
    pub first_strike: bool,
    /// Attackers whose assignment is still to be made, in order.
    pub remaining: Vec<EntityId>,
    /// `(source, recipient, amount)`; dealt all at once when assignment ends.
    pub assigned: Vec<(EntityId, EntityId, u32)>,
}

/// How to resume the suspended computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    CastSpell(CastProgress),
    ActivateAbility(ActivationProgress),
    /// Re-enter `effect`'s handler with the response, then run what is left of `work`.
    ResumeEffect {
        effect: Effect,
        memo: Memo,
        work: EffectWork,
        then: Completion,
    },
    PlaceTriggers(TriggerPlacement),
    /// Damage assignment order for `attacker`'s blockers, then for each of `remaining`.
    OrderBlockers {
        attacker: EntityId,
        remaining: Vec<EntityId>,
    },
    CombatDamage(DamageProgress),
    /// Discard down to the maximum hand size, then finish cleanup.
    CleanupDiscard,
}

impl Continuation {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Continuation::CastSpell(_) => "cast spell",
            Continuation::ActivateAbility(_) => "activate ability",
            Continuation::ResumeEffect { .. } => "resume effect",
            Continuation::PlaceTriggers(_) => "place triggers",
            Continuation::OrderBlockers { .. } => "order blockers",
            Continuation::CombatDamage(_) => "combat damage",
            Continuation::CleanupDiscard => "cleanup discard",
        }
    }
}
