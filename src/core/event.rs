//! Game events.
//!
//! Events are immutable records of what happened during a transition, emitted
//! alongside the new state for observation, animation and logging. The engine
//! reads them back only to detect triggered abilities; an event never changes
//! state by itself.

use serde::{Deserialize, Serialize};

use super::component::CounterKind;
use super::entity::EntityId;
use super::player::PlayerId;
use crate::cards::Mana;
use crate::decision::DecisionId;
use crate::turn::{Phase, Step};
use crate::zones::ZoneKey;

/// Why a player lost the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    ZeroLife,
    DrewFromEmptyLibrary,
    Conceded,
}

/// Something that happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An entity moved between zones. `controller` is the controller at the
    /// moment of the move (the last known controller when leaving play).
    ZoneChange {
        entity: EntityId,
        from: ZoneKey,
        to: ZoneKey,
        controller: PlayerId,
    },
    TokenCreated {
        token: EntityId,
        controller: PlayerId,
    },
    LifeChanged {
        player: PlayerId,
        old: i64,
        new: i64,
    },
    DamageDealt {
        source: EntityId,
        target: EntityId,
        amount: u32,
        combat: bool,
    },

    SpellCast {
        spell: EntityId,
        controller: PlayerId,
    },
    SpellResolved {
        spell: EntityId,
    },
    SpellCountered {
        spell: EntityId,
    },
    SpellFizzled {
        spell: EntityId,
    },
    AbilityActivated {
        ability: EntityId,
        source: EntityId,
        controller: PlayerId,
    },
    /// A mana ability resolved without using the stack.
    ManaAbilityActivated {
        source: EntityId,
        controller: PlayerId,
    },
    AbilityTriggered {
        ability: EntityId,
        source: EntityId,
        controller: PlayerId,
    },
    AbilityResolved {
        ability: EntityId,
    },
    AbilityFizzled {
        ability: EntityId,
    },
    AbilityCountered {
        ability: EntityId,
    },

    AttackersDeclared {
        player: PlayerId,
        attackers: Vec<(EntityId, PlayerId)>,
    },
    BlockersDeclared {
        player: PlayerId,
        blockers: Vec<(EntityId, EntityId)>,
    },
    BlockerOrderDeclared {
        attacker: EntityId,
        order: Vec<EntityId>,
    },
    DamageAssigned {
        source: EntityId,
        assignments: Vec<(EntityId, u32)>,
    },

    PhaseChanged {
        phase: Phase,
    },
    StepChanged {
        step: Step,
    },
    TurnChanged {
        turn: u32,
        active: PlayerId,
    },
    PriorityChanged {
        player: Option<PlayerId>,
    },

    Tapped {
        entity: EntityId,
    },
    Untapped {
        entity: EntityId,
    },
    CountersAdded {
        entity: EntityId,
        kind: CounterKind,
        amount: u32,
    },
    CountersRemoved {
        entity: EntityId,
        kind: CounterKind,
        amount: u32,
    },

    CardsDrawn {
        player: PlayerId,
        cards: Vec<EntityId>,
    },
    DrawFailed {
        player: PlayerId,
    },
    CardsDiscarded {
        player: PlayerId,
        cards: Vec<EntityId>,
    },
    LibraryShuffled {
        player: PlayerId,
    },
    Mulligan {
        player: PlayerId,
        count: u32,
    },
    HandKept {
        player: PlayerId,
        mulligans: u32,
    },

    DecisionRequested {
        decision: DecisionId,
        player: PlayerId,
    },
    DecisionSubmitted {
        decision: DecisionId,
        player: PlayerId,
    },

    PlayerLost {
        player: PlayerId,
        reason: LossReason,
    },
    GameEnded {
        winner: Option<PlayerId>,
    },

    ManaAdded {
        player: PlayerId,
        mana: Mana,
        amount: u32,
    },
    ManaSpent {
        player: PlayerId,
        amount: u32,
    },
}

impl GameEvent {
    /// Is this an event produced by an effect changing the game (as opposed to
    /// bookkeeping about the stack, turn structure or decisions)?
    #[must_use]
    pub fn is_effect_event(&self) -> bool {
        matches!(
            self,
            GameEvent::TokenCreated { .. }
                | GameEvent::LifeChanged { .. }
                | GameEvent::DamageDealt { .. }
                | GameEvent::SpellCountered { .. }
                | GameEvent::AbilityCountered { .. }
                | GameEvent::Tapped { .. }
                | GameEvent::Untapped { .. }
                | GameEvent::CountersAdded { .. }
                | GameEvent::CountersRemoved { .. }
                | GameEvent::CardsDrawn { .. }
                | GameEvent::DrawFailed { .. }
                | GameEvent::CardsDiscarded { .. }
                | GameEvent::LibraryShuffled { .. }
                | GameEvent::ManaAdded { .. }
        )
    }
}
