//! Pending decisions: what a paused game is waiting for.

use serde::{Deserialize, Serialize};

use crate::cards::Color;
use crate::core::{EntityId, PlayerId};

/// Unique identifier of a decision within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub u32);

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Legal choices for one target slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSlot {
    pub legal: Vec<EntityId>,
    pub min: usize,
    pub max: usize,
}

/// A blocker in damage assignment order, with the damage that is lethal to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageSlot {
    pub blocker: EntityId,
    pub lethal: u32,
}

/// What is being asked, with the bounds a response is validated against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    ChooseTargets {
        slots: Vec<TargetSlot>,
    },
    ChooseCards {
        legal: Vec<EntityId>,
        min: usize,
        max: usize,
    },
    YesNo,
    ChooseMode {
        modes: Vec<String>,
        count: usize,
    },
    ChooseColor {
        legal: Vec<Color>,
    },
    ChooseNumber {
        min: u32,
        max: u32,
    },
    /// Divide `amount` among `targets`, each getting at least `min_each`.
    Distribute {
        amount: u32,
        targets: Vec<EntityId>,
        min_each: u32,
    },
    /// Put `objects` in order; the first listed is the first placed.
    OrderObjects {
        objects: Vec<EntityId>,
    },
    /// Separate `objects` into two piles.
    SplitPiles {
        objects: Vec<EntityId>,
    },
    ChoosePile {
        piles: [Vec<EntityId>; 2],
    },
    /// Assign an attacker's combat damage among its blockers, in order, and
    /// to `trample_to` once every blocker has lethal damage.
    AssignCombatDamage {
        attacker: EntityId,
        amount: u32,
        blockers: Vec<DamageSlot>,
        trample_to: Option<EntityId>,
    },
}

impl DecisionKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DecisionKind::ChooseTargets { .. } => "choose targets",
            DecisionKind::ChooseCards { .. } => "choose cards",
            DecisionKind::YesNo => "yes/no",
            DecisionKind::ChooseMode { .. } => "choose mode",
            DecisionKind::ChooseColor { .. } => "choose color",
            DecisionKind::ChooseNumber { .. } => "choose number",
            DecisionKind::Distribute { .. } => "distribute",
            DecisionKind::OrderObjects { .. } => "order objects",
            DecisionKind::SplitPiles { .. } => "split piles",
            DecisionKind::ChoosePile { .. } => "choose pile",
            DecisionKind::AssignCombatDamage { .. } => "assign combat damage",
        }
    }
}

/// A question for one player. At most one is pending per snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub id: DecisionId,
    pub player: PlayerId,
    /// The card or ability the question is about, for display.
    pub source: Option<EntityId>,
    pub prompt: String,
    pub kind: DecisionKind,
}
