//! Trigger conditions.
//!
//! A condition names the kind of event a triggered ability waits for,
//! relative to the permanent that has the ability ("self") and its
//! controller ("you").

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerCondition {
    /// Self enters the battlefield.
    EntersBattlefield,
    /// Another creature enters the battlefield, under anyone's control.
    AnotherCreatureEnters,
    /// Self is put into a graveyard from the battlefield.
    Dies,
    BeginningOfYourUpkeep,
    YouCastSpell,
    OpponentCastsSpell,
    /// Self is declared as an attacker.
    Attacks,
    DealsCombatDamageToPlayer,
}

/// A triggered ability waiting to be put on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub source: EntityId,
    /// Card name of the source, kept so the ability survives its source
    /// stopping being tracked.
    pub card: String,
    pub controller: PlayerId,
    /// Index into the definition's triggered abilities.
    pub ability: usize,
    /// The other object the event was about, if any.
    pub subject: Option<EntityId>,
}
