//! Effect targeting.
//!
//! - `TargetFilter`: what kind of object a target may be
//! - `TargetRequirement`: a filter plus how many targets a slot takes
//! - legality checks used when casting, when putting triggers on the stack
//!   and again immediately before resolution
//!
//! Candidates are players still in the game, permanents on the battlefield
//! and spells on the stack, in that order.

use serde::{Deserialize, Serialize};

use crate::cards::CardType;
use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::TargetSlot;
use crate::error::RuleViolation;
use crate::rules::EffectiveView;
use crate::stack::StackItemKind;

/// Filters for valid targets, evaluated relative to the choosing player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFilter {
    /// A creature or a player.
    Any,
    Creature,
    CreatureYouControl,
    CreatureOpponentControls,
    Player,
    Opponent,
    Permanent,
    NonlandPermanent,
    /// A spell on the stack.
    Spell,
}

impl TargetFilter {
    /// Does `candidate` match from `chooser`'s point of view?
    #[must_use]
    pub fn matches(
        &self,
        state: &GameState,
        view: &EffectiveView,
        chooser: PlayerId,
        candidate: EntityId,
    ) -> bool {
        let player_count = state.player_count();
        if let Some(player) = candidate.as_player(player_count) {
            if state.has_lost(player) {
                return false;
            }
            return match self {
                TargetFilter::Any | TargetFilter::Player => true,
                TargetFilter::Opponent => player != chooser,
                _ => false,
            };
        }

        if state.is_on_battlefield(candidate) {
            let creature = view.is_creature(candidate);
            let controller = view.controller(candidate).or_else(|| state.controller_of(candidate));
            return match self {
                TargetFilter::Any | TargetFilter::Creature => creature,
                TargetFilter::CreatureYouControl => creature && controller == Some(chooser),
                TargetFilter::CreatureOpponentControls => {
                    creature && controller.map_or(false, |c| c != chooser)
                }
                TargetFilter::Permanent => true,
                TargetFilter::NonlandPermanent => !view.has_type(candidate, CardType::Land),
                TargetFilter::Player | TargetFilter::Opponent | TargetFilter::Spell => false,
            };
        }

        if matches!(self, TargetFilter::Spell) {
            return state
                .entity(candidate)
                .and_then(|c| c.stack_item())
                .map_or(false, |item| item.kind == StackItemKind::Spell)
                && state.zone_of(candidate).map(|z| z.kind) == Some(crate::zones::ZoneKind::Stack);
        }

        false
    }
}

/// One target slot: a filter and a count range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequirement {
    pub filter: TargetFilter,
    pub min: usize,
    pub max: usize,
}

impl TargetRequirement {
    /// Exactly one target.
    #[must_use]
    pub const fn one(filter: TargetFilter) -> Self {
        Self {
            filter,
            min: 1,
            max: 1,
        }
    }

    /// Zero to `max` targets.
    #[must_use]
    pub const fn up_to(max: usize, filter: TargetFilter) -> Self {
        Self { filter, min: 0, max }
    }

    #[must_use]
    pub const fn between(min: usize, max: usize, filter: TargetFilter) -> Self {
        Self { filter, min, max }
    }
}

/// Every candidate matching a requirement, excluding `source`.
#[must_use]
pub fn legal_targets(
    state: &GameState,
    view: &EffectiveView,
    chooser: PlayerId,
    requirement: &TargetRequirement,
    source: Option<EntityId>,
) -> Vec<EntityId> {
    let players = state.living_players().map(EntityId::player);
    let permanents = state.battlefield();
    let spells = state.stack().into_iter();

    players
        .chain(permanents)
        .chain(spells)
        .filter(|&e| Some(e) != source)
        .filter(|&e| requirement.filter.matches(state, view, chooser, e))
        .collect()
}

/// Can every slot be filled with at least its minimum?
#[must_use]
pub fn has_legal_assignment(legal: &[Vec<EntityId>], requirements: &[TargetRequirement]) -> bool {
    requirements
        .iter()
        .zip(legal)
        .all(|(req, candidates)| candidates.len() >= req.min)
}

/// The only possible assignment, if every slot is forced: each slot has
/// exactly as many candidates as it needs and that count is also its maximum.
#[must_use]
pub fn forced_targets(
    legal: &[Vec<EntityId>],
    requirements: &[TargetRequirement],
) -> Option<Vec<Vec<EntityId>>> {
    requirements
        .iter()
        .zip(legal)
        .map(|(req, candidates)| {
            (req.min == req.max && candidates.len() == req.min).then(|| candidates.clone())
        })
        .collect()
}

/// What happens when targets are chosen for a spell or ability being put
/// on the stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetChoice {
    /// No player input needed: there are no slots or every slot is forced.
    Forced(Vec<Vec<EntityId>>),
    /// The controller has to choose.
    Ask(Vec<TargetSlot>),
    /// Some slot cannot reach its minimum.
    Impossible,
}

#[must_use]
pub fn target_choice(
    state: &GameState,
    view: &EffectiveView,
    chooser: PlayerId,
    requirements: &[TargetRequirement],
    source: Option<EntityId>,
) -> TargetChoice {
    let legal: Vec<Vec<EntityId>> = requirements
        .iter()
        .map(|req| legal_targets(state, view, chooser, req, source))
        .collect();
    if !has_legal_assignment(&legal, requirements) {
        return TargetChoice::Impossible;
    }
    if let Some(forced) = forced_targets(&legal, requirements) {
        return TargetChoice::Forced(forced);
    }
    TargetChoice::Ask(
        requirements
            .iter()
            .zip(legal)
            .map(|(req, legal)| TargetSlot {
                legal,
                min: req.min,
                max: req.max,
            })
            .collect(),
    )
}

/// Check a full target choice against the requirements.
pub fn validate_targets(
    state: &GameState,
    view: &EffectiveView,
    chooser: PlayerId,
    requirements: &[TargetRequirement],
    chosen: &[Vec<EntityId>],
    source: Option<EntityId>,
) -> Result<(), RuleViolation> {
    if chosen.len() != requirements.len() {
        return Err(RuleViolation::TargetCount(format!(
            "expected {} target slots, got {}",
            requirements.len(),
            chosen.len()
        )));
    }
    for (slot, (req, targets)) in requirements.iter().zip(chosen).enumerate() {
        if targets.len() < req.min || targets.len() > req.max {
            return Err(RuleViolation::TargetCount(format!(
                "slot {} takes {}..={} targets, got {}",
                slot,
                req.min,
                req.max,
                targets.len()
            )));
        }
        for (i, &target) in targets.iter().enumerate() {
            if targets[..i].contains(&target) {
                return Err(RuleViolation::TargetCount(format!(
                    "{} chosen twice in slot {}",
                    target, slot
                )));
            }
            if Some(target) == source || !req.filter.matches(state, view, chooser, target) {
                return Err(RuleViolation::IllegalTarget { slot, target });
            }
        }
    }
    Ok(())
}

/// Targets that are still legal, slot by slot.
#[must_use]
pub fn still_legal(
    state: &GameState,
    view: &EffectiveView,
    chooser: PlayerId,
    requirements: &[TargetRequirement],
    chosen: &[Vec<EntityId>],
) -> Vec<Vec<EntityId>> {
    requirements
        .iter()
        .zip(chosen)
        .map(|(req, targets)| {
            targets
                .iter()
                .copied()
                .filter(|&t| req.filter.matches(state, view, chooser, t))
                .collect()
        })
        .collect()
}
