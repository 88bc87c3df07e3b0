//! Activating abilities of permanents.
//!
//! Costs are paid in a fixed order: tap, mana, then sacrifice. A sacrifice
//! with more candidates than it needs is a decision. Targets come after the
//! costs. Mana abilities skip the stack and resolve on the spot.

use std::collections::BTreeSet;

use tracing::debug;

use super::actions::{require_priority, ActionHandler};
use super::payment;
use super::run::{Progress, Run};
use super::Engine;
use crate::cards::{ActivatedAbility, CardDefinition, Keyword, PaymentStrategy};
use crate::core::{Action, ActionKind, Component, EntityId, GameEvent, GameState, PlayerId};
use crate::decision::{ActivationProgress, Completion, Continuation, DecisionKind, DecisionResponse};
use crate::effects::{
    resolver, target_choice, validate_targets, EffectContext, EffectWork, TargetChoice, TargetFilter,
};
use crate::error::{contract_violation, Result, RuleViolation};
use crate::rules::EffectiveView;
use crate::stack::{StackItem, StackItemKind};

pub(crate) struct ActivateAbility;

/// Permanents `player` could sacrifice to a cost.
fn sacrifice_candidates(
    state: &GameState,
    view: &EffectiveView,
    player: PlayerId,
    filter: &TargetFilter,
) -> Vec<EntityId> {
    state
        .permanents_of(player)
        .filter(|&e| filter.matches(state, view, player, e))
        .collect()
}

fn ability_of<'e>(
    engine: &'e Engine,
    state: &GameState,
    source: EntityId,
    index: usize,
) -> Result<(&'e CardDefinition, &'e ActivatedAbility)> {
    let name = state
        .card_name(source)
        .ok_or(RuleViolation::UnknownEntity(source))?;
    let def = engine
        .catalog()
        .definition_for(name)
        .ok_or_else(|| RuleViolation::UnknownCard(name.to_string()))?;
    let ability = def.activated.get(index).ok_or(RuleViolation::NoSuchAbility {
        source_id: source,
        index,
    })?;
    Ok((def, ability))
}

impl ActionHandler for ActivateAbility {
    fn validate(&self, engine: &Engine, state: &GameState, action: &Action) -> Result<()> {
        let ActionKind::ActivateAbility {
            source,
            ability,
            targets,
        } = &action.kind
        else {
            contract_violation("activate handler given another action");
        };
        let player = action.player;
        if state.entity(*source).is_none() {
            return Err(RuleViolation::UnknownEntity(*source));
        }
        if !state.is_on_battlefield(*source) || state.controller_of(*source) != Some(player) {
            return Err(RuleViolation::NotYourPermanent(*source));
        }
        let (def, ability) = ability_of(engine, state, *source, *ability)?;
        require_priority(state, player)?;

        let view = engine.project(state);
        let mut paying = state.clone();
        if ability.cost.tap {
            let Some(components) = state.entity(*source) else {
                return Err(RuleViolation::UnknownEntity(*source));
            };
            if components.is_tapped() {
                return Err(RuleViolation::Tapped(*source));
            }
            if def.is_creature() && components.is_summoning_sick() && !view.has_keyword(*source, Keyword::Haste) {
                return Err(RuleViolation::SummoningSick(*source));
            }
            paying = paying.update_entity(*source, |c| c.with(Component::Tapped));
        }
        if !payment::can_pay(engine, &paying, player, &ability.cost.mana, 0, &PaymentStrategy::Auto) {
            return Err(RuleViolation::CannotPay(format!("{}", ability.cost.mana)));
        }
        if let Some(sacrifice) = &ability.cost.sacrifice {
            let candidates = sacrifice_candidates(state, &view, player, &sacrifice.filter);
            if candidates.len() < sacrifice.count as usize {
                return Err(RuleViolation::CannotSacrifice);
            }
        }

        match targets {
            Some(chosen) => validate_targets(state, &view, player, &ability.targets, chosen, None),
            None => match target_choice(state, &view, player, &ability.targets, None) {
                TargetChoice::Impossible => Err(RuleViolation::TargetCount(format!(
                    "{} has no legal targets",
                    ability.text
                ))),
                _ => Ok(()),
            },
        }
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        let ActionKind::ActivateAbility {
            source,
            ability: index,
            targets,
        } = &action.kind
        else {
            contract_violation("activate handler given another action");
        };
        let player = action.player;
        let (_, ability) = ability_of(run.engine(), run.state(), *source, *index)?;

        if ability.cost.tap {
            run.tap(*source);
        }
        if !payment::pay(run, player, &ability.cost.mana, 0, &PaymentStrategy::Auto) {
            contract_violation(format!("validated cost of {} could not be paid", source));
        }

        if ability.is_mana_ability() {
            debug!(source = %source, player = %player, "mana ability");
            run.emit(GameEvent::ManaAbilityActivated {
                source: *source,
                controller: player,
            });
            let ctx = EffectContext::new(player, Some(*source));
            return Ok(resolver::execute(
                run,
                EffectWork::new(ctx, ability.effect.clone()),
                Completion::Immediate,
            ));
        }

        let progress = ActivationProgress {
            source: *source,
            ability: *index,
            player,
            sacrificed: ability.cost.sacrifice.is_none().then(Vec::new),
            targets: targets.clone(),
        };
        Ok(continue_activation(run, progress))
    }
}

fn continue_activation(run: &mut Run<'_>, mut progress: ActivationProgress) -> Progress {
    let source = progress.source;
    let player = progress.player;
    let (def, ability) = match ability_of(run.engine(), run.state(), source, progress.ability) {
        Ok(found) => found,
        Err(reason) => contract_violation(format!("activating {}: {}", source, reason)),
    };

    if progress.sacrificed.is_none() {
        let Some(cost) = &ability.cost.sacrifice else {
            contract_violation("sacrifice asked for an ability without a sacrifice cost");
        };
        let view = run.view();
        let candidates = sacrifice_candidates(run.state(), &view, player, &cost.filter);
        let count = cost.count as usize;
        if candidates.len() > count {
            return run.suspend(
                player,
                Some(source),
                format!("Choose {} to sacrifice for {}", count, def.name),
                DecisionKind::ChooseCards {
                    legal: candidates,
                    min: count,
                    max: count,
                },
                Continuation::ActivateAbility(progress),
            );
        }
        sacrifice(run, &candidates);
        progress.sacrificed = Some(candidates);
    }

    if progress.targets.is_none() {
        let view = run.view();
        match target_choice(run.state(), &view, player, &ability.targets, None) {
            TargetChoice::Forced(targets) => progress.targets = Some(targets),
            TargetChoice::Ask(slots) => {
                return run.suspend(
                    player,
                    Some(source),
                    format!("Choose targets for {}", ability.text),
                    DecisionKind::ChooseTargets { slots },
                    Continuation::ActivateAbility(progress),
                );
            }
            TargetChoice::Impossible => {
                debug!(source = %source, "ability lost its targets while costs were paid");
                return Progress::Done;
            }
        }
    }

    let kind = StackItemKind::ActivatedAbility {
        source,
        index: progress.ability,
    };
    let targets = progress.targets.unwrap_or_default();
    let id = run.create_ability(&def.name, StackItem::ability(kind, player, targets));
    debug!(ability = %id, source = %source, player = %player, "activated");
    run.emit(GameEvent::AbilityActivated {
        ability: id,
        source,
        controller: player,
    });
    run.clear_passed();
    run.give_priority(Some(player));
    Progress::Done
}

fn sacrifice(run: &mut Run<'_>, chosen: &[EntityId]) {
    let unique: BTreeSet<EntityId> = chosen.iter().copied().collect();
    for id in unique {
        run.sacrifice(id);
    }
}

pub(crate) fn resume(run: &mut Run<'_>, mut progress: ActivationProgress, response: &DecisionResponse) -> Progress {
    match response {
        DecisionResponse::Cards(chosen) if progress.sacrificed.is_none() => {
            sacrifice(run, chosen);
            progress.sacrificed = Some(chosen.clone());
        }
        DecisionResponse::Targets(targets) if progress.targets.is_none() => {
            progress.targets = Some(targets.clone());
        }
        other => contract_violation(format!("activation resumed with {:?}", other)),
    }
    continue_activation(run, progress)
}
