//! Effect definitions.
//!
//! Effects are plain data. A card script is a tree of `Effect` values that the
//! executor walks step by step; each leaf is run by the handler registered for
//! its [`EffectKind`]. Because a script is data, a half-executed script is data
//! too: the unexecuted remainder is carried in the continuation when a handler
//! needs a player's input.
//!
//! ## Control effects
//!
//! - `Composite`: run children in order
//! - `IfYouDo`: run `then` only if `first` did something
//! - `May`: ask yes/no, run the effect on yes
//! - `ChooseMode`: ask which mode(s), run them
//! - `ChooseNumber`: ask for a number, run `then` with `Amount::ChosenNumber` bound

use serde::{Deserialize, Serialize};

use super::targeting::{TargetFilter, TargetRequirement};
use crate::cards::Mana;
use crate::core::CounterKind;

/// A numeric quantity in a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Fixed(u32),
    /// The X paid when casting.
    X,
    /// The number picked by an enclosing `ChooseNumber`.
    ChosenNumber,
}

/// Who or what an effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    /// Targets chosen when the spell or ability was put on the stack, by slot.
    Targeted(usize),
    /// Chosen by the controller while the effect resolves.
    ChosenOnResolution(TargetRequirement),
    Controller,
    Source,
    EachOpponent,
    EachPlayer,
}

/// One mode of a modal effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub text: String,
    pub effect: Effect,
}

/// An effect script node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    DealDamage { amount: Amount, target: EffectTarget },
    GainLife { amount: Amount, target: EffectTarget },
    LoseLife { amount: Amount, target: EffectTarget },
    DrawCards { amount: Amount, target: EffectTarget },
    Destroy { target: EffectTarget },
    Exile { target: EffectTarget },
    ReturnToHand { target: EffectTarget },
    Tap { target: EffectTarget },
    Untap { target: EffectTarget },
    AddCounters { kind: CounterKind, amount: Amount, target: EffectTarget },
    RemoveCounters { kind: CounterKind, amount: Amount, target: EffectTarget },
    /// Until end of turn.
    ModifyPowerToughness { power: i32, toughness: i32, target: EffectTarget },
    /// Create tokens of a catalog card under the controller's control.
    CreateToken { name: String, count: Amount },
    CounterSpell { target: EffectTarget },
    /// Add mana to the controller's pool; `None` asks for a color.
    AddMana { mana: Option<Mana>, amount: u32 },
    /// The target player discards cards of their choice.
    Discard { amount: u32, target: EffectTarget },
    /// The target player sacrifices permanents of their choice.
    Sacrifice { filter: TargetFilter, amount: u32, target: EffectTarget },
    Composite(Vec<Effect>),
    IfYouDo { first: Box<Effect>, then: Box<Effect> },
    May { prompt: String, effect: Box<Effect> },
    ChooseMode { modes: Vec<Mode>, count: usize },
    ChooseNumber { min: u32, max: u32, then: Box<Effect> },
    /// Divide damage among the targets in a slot.
    DistributeDamage { amount: u32, target: EffectTarget },
    /// Look at the top cards of your library and put them back in any order.
    ArrangeTop { count: u32 },
    /// Reveal the top cards; an opponent splits them into two piles; you put one
    /// pile into your hand and the other into your graveyard.
    RevealAndSplit { count: u32 },
    Shuffle { target: EffectTarget },
    /// Dispatched to an externally registered handler by tag.
    Custom { tag: String, values: Vec<i64> },
}

/// Registry key for effect handlers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    DealDamage,
    GainLife,
    LoseLife,
    DrawCards,
    Destroy,
    Exile,
    ReturnToHand,
    Tap,
    Untap,
    AddCounters,
    RemoveCounters,
    ModifyPowerToughness,
    CreateToken,
    CounterSpell,
    AddMana,
    Discard,
    Sacrifice,
    Composite,
    IfYouDo,
    May,
    ChooseMode,
    ChooseNumber,
    DistributeDamage,
    ArrangeTop,
    RevealAndSplit,
    Shuffle,
    Custom(String),
}

impl Effect {
    #[must_use]
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::DealDamage { .. } => EffectKind::DealDamage,
            Effect::GainLife { .. } => EffectKind::GainLife,
            Effect::LoseLife { .. } => EffectKind::LoseLife,
            Effect::DrawCards { .. } => EffectKind::DrawCards,
            Effect::Destroy { .. } => EffectKind::Destroy,
            Effect::Exile { .. } => EffectKind::Exile,
            Effect::ReturnToHand { .. } => EffectKind::ReturnToHand,
            Effect::Tap { .. } => EffectKind::Tap,
            Effect::Untap { .. } => EffectKind::Untap,
            Effect::AddCounters { .. } => EffectKind::AddCounters,
            Effect::RemoveCounters { .. } => EffectKind::RemoveCounters,
            Effect::ModifyPowerToughness { .. } => EffectKind::ModifyPowerToughness,
            Effect::CreateToken { .. } => EffectKind::CreateToken,
            Effect::CounterSpell { .. } => EffectKind::CounterSpell,
            Effect::AddMana { .. } => EffectKind::AddMana,
            Effect::Discard { .. } => EffectKind::Discard,
            Effect::Sacrifice { .. } => EffectKind::Sacrifice,
            Effect::Composite(_) => EffectKind::Composite,
            Effect::IfYouDo { .. } => EffectKind::IfYouDo,
            Effect::May { .. } => EffectKind::May,
            Effect::ChooseMode { .. } => EffectKind::ChooseMode,
            Effect::ChooseNumber { .. } => EffectKind::ChooseNumber,
            Effect::DistributeDamage { .. } => EffectKind::DistributeDamage,
            Effect::ArrangeTop { .. } => EffectKind::ArrangeTop,
            Effect::RevealAndSplit { .. } => EffectKind::RevealAndSplit,
            Effect::Shuffle { .. } => EffectKind::Shuffle,
            Effect::Custom { tag, .. } => EffectKind::Custom(tag.clone()),
        }
    }

    /// The target descriptor of effects that apply to objects or players.
    #[must_use]
    pub fn target(&self) -> Option<&EffectTarget> {
        match self {
            Effect::DealDamage { target, .. }
            | Effect::GainLife { target, .. }
            | Effect::LoseLife { target, .. }
            | Effect::DrawCards { target, .. }
            | Effect::Destroy { target }
            | Effect::Exile { target }
            | Effect::ReturnToHand { target }
            | Effect::Tap { target }
            | Effect::Untap { target }
            | Effect::AddCounters { target, .. }
            | Effect::RemoveCounters { target, .. }
            | Effect::ModifyPowerToughness { target, .. }
            | Effect::CounterSpell { target }
            | Effect::Discard { target, .. }
            | Effect::Sacrifice { target, .. }
            | Effect::DistributeDamage { target, .. }
            | Effect::Shuffle { target } => Some(target),
            _ => None,
        }
    }

    // === Script builders ===

    #[must_use]
    pub fn damage(amount: u32, target: EffectTarget) -> Self {
        Effect::DealDamage {
            amount: Amount::Fixed(amount),
            target,
        }
    }

    #[must_use]
    pub fn draw(amount: u32) -> Self {
        Effect::DrawCards {
            amount: Amount::Fixed(amount),
            target: EffectTarget::Controller,
        }
    }

    #[must_use]
    pub fn if_you_do(first: Effect, then: Effect) -> Self {
        Effect::IfYouDo {
            first: Box::new(first),
            then: Box::new(then),
        }
    }

    #[must_use]
    pub fn may(prompt: impl Into<String>, effect: Effect) -> Self {
        Effect::May {
            prompt: prompt.into(),
            effect: Box::new(effect),
        }
    }
}
