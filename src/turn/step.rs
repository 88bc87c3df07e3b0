//! Phases and steps of a turn.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Beginning,
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

/// Steps in turn order. `FirstStrikeDamage` only happens in a combat where
/// some creature has first strike or double strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    // Beginning
    Untap,
    Upkeep,
    Draw,

    // Precombat main
    Main1,

    // Combat
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    FirstStrikeDamage,
    CombatDamage,
    EndCombat,

    // Postcombat main
    Main2,

    // Ending
    End,
    Cleanup,
}

impl Step {
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Step::Untap | Step::Upkeep | Step::Draw => Phase::Beginning,
            Step::Main1 => Phase::PrecombatMain,
            Step::BeginCombat
            | Step::DeclareAttackers
            | Step::DeclareBlockers
            | Step::FirstStrikeDamage
            | Step::CombatDamage
            | Step::EndCombat => Phase::Combat,
            Step::Main2 => Phase::PostcombatMain,
            Step::End | Step::Cleanup => Phase::Ending,
        }
    }

    /// The following step in the full sequence; `None` after cleanup.
    #[must_use]
    pub const fn next(self) -> Option<Step> {
        match self {
            Step::Untap => Some(Step::Upkeep),
            Step::Upkeep => Some(Step::Draw),
            Step::Draw => Some(Step::Main1),
            Step::Main1 => Some(Step::BeginCombat),
            Step::BeginCombat => Some(Step::DeclareAttackers),
            Step::DeclareAttackers => Some(Step::DeclareBlockers),
            Step::DeclareBlockers => Some(Step::FirstStrikeDamage),
            Step::FirstStrikeDamage => Some(Step::CombatDamage),
            Step::CombatDamage => Some(Step::EndCombat),
            Step::EndCombat => Some(Step::Main2),
            Step::Main2 => Some(Step::End),
            Step::End => Some(Step::Cleanup),
            Step::Cleanup => None,
        }
    }

    /// Do players receive priority during this step?
    #[must_use]
    pub const fn has_priority(self) -> bool {
        !matches!(self, Step::Untap | Step::Cleanup)
    }

    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Step::Main1 | Step::Main2)
    }

    #[must_use]
    pub const fn is_combat_damage(self) -> bool {
        matches!(self, Step::FirstStrikeDamage | Step::CombatDamage)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
