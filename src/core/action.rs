//! Actions: intents submitted by players.
//!
//! Every action carries the acting player. The processor validates it against
//! the current snapshot and either applies it or rejects it with a
//! [`RuleViolation`](crate::RuleViolation).
//!
//! ```
//! use ccg_rules::core::{Action, ActionKind, EntityId, PlayerId};
//!
//! let pass = Action::pass(PlayerId::new(0));
//! assert_eq!(pass.tag(), ccg_rules::core::ActionTag::PassPriority);
//!
//! let land = Action::new(PlayerId::new(1), ActionKind::PlayLand { card: EntityId(12) });
//! assert_eq!(land.player, PlayerId::new(1));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;
use crate::cards::PaymentStrategy;
use crate::decision::{DecisionId, DecisionResponse};

/// What the player wants to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    PassPriority,
    /// Cast a spell from hand. Targets and X left as `None` are asked for
    /// through decisions when they cannot be inferred.
    CastSpell {
        card: EntityId,
        targets: Option<Vec<Vec<EntityId>>>,
        x: Option<u32>,
        payment: PaymentStrategy,
    },
    ActivateAbility {
        source: EntityId,
        ability: usize,
        targets: Option<Vec<Vec<EntityId>>>,
    },
    PlayLand {
        card: EntityId,
    },
    /// Attacker -> defending player.
    DeclareAttackers {
        attackers: BTreeMap<EntityId, PlayerId>,
    },
    /// Blocker -> attacker it blocks.
    DeclareBlockers {
        blockers: BTreeMap<EntityId, EntityId>,
    },
    /// Damage assignment order for the blockers of one attacker.
    OrderBlockers {
        attacker: EntityId,
        order: Vec<EntityId>,
    },
    SubmitDecision {
        decision: DecisionId,
        response: DecisionResponse,
    },
    TakeMulligan,
    KeepHand,
    BottomCards {
        cards: Vec<EntityId>,
    },
    Concede,
}

/// Dispatch key for [`ActionKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionTag {
    PassPriority,
    CastSpell,
    ActivateAbility,
    PlayLand,
    DeclareAttackers,
    DeclareBlockers,
    OrderBlockers,
    SubmitDecision,
    TakeMulligan,
    KeepHand,
    BottomCards,
    Concede,
}

impl ActionKind {
    #[must_use]
    pub fn tag(&self) -> ActionTag {
        match self {
            ActionKind::PassPriority => ActionTag::PassPriority,
            ActionKind::CastSpell { .. } => ActionTag::CastSpell,
            ActionKind::ActivateAbility { .. } => ActionTag::ActivateAbility,
            ActionKind::PlayLand { .. } => ActionTag::PlayLand,
            ActionKind::DeclareAttackers { .. } => ActionTag::DeclareAttackers,
            ActionKind::DeclareBlockers { .. } => ActionTag::DeclareBlockers,
            ActionKind::OrderBlockers { .. } => ActionTag::OrderBlockers,
            ActionKind::SubmitDecision { .. } => ActionTag::SubmitDecision,
            ActionKind::TakeMulligan => ActionTag::TakeMulligan,
            ActionKind::KeepHand => ActionTag::KeepHand,
            ActionKind::BottomCards { .. } => ActionTag::BottomCards,
            ActionKind::Concede => ActionTag::Concede,
        }
    }
}

impl std::fmt::Display for ActionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A complete action: who does what.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub player: PlayerId,
    pub kind: ActionKind,
}

impl Action {
    #[must_use]
    pub fn new(player: PlayerId, kind: ActionKind) -> Self {
        Self { player, kind }
    }

    #[must_use]
    pub fn pass(player: PlayerId) -> Self {
        Self::new(player, ActionKind::PassPriority)
    }

    /// Cast with everything left to the engine: targets and X are asked for,
    /// mana is paid automatically.
    #[must_use]
    pub fn cast(player: PlayerId, card: EntityId) -> Self {
        Self::new(
            player,
            ActionKind::CastSpell {
                card,
                targets: None,
                x: None,
                payment: PaymentStrategy::Auto,
            },
        )
    }

    /// Cast with targets chosen up front.
    #[must_use]
    pub fn cast_targeting(player: PlayerId, card: EntityId, targets: Vec<Vec<EntityId>>) -> Self {
        Self::new(
            player,
            ActionKind::CastSpell {
                card,
                targets: Some(targets),
                x: None,
                payment: PaymentStrategy::Auto,
            },
        )
    }

    #[must_use]
    pub fn activate(player: PlayerId, source: EntityId, ability: usize) -> Self {
        Self::new(
            player,
            ActionKind::ActivateAbility {
                source,
                ability,
                targets: None,
            },
        )
    }

    #[must_use]
    pub fn submit(player: PlayerId, decision: DecisionId, response: DecisionResponse) -> Self {
        Self::new(player, ActionKind::SubmitDecision { decision, response })
    }

    #[must_use]
    pub fn tag(&self) -> ActionTag {
        self.kind.tag()
    }
}

/// Record of an accepted action in the game history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub action: ActionKind,
    pub turn: u32,
    /// Position in the history, starting at 0.
    pub sequence: u32,
}
