//! Casting spells.
//!
//! The card moves to the stack first. Choices the action left open are then
//! asked for in order (X, then targets), the cost is paid and the caster
//! keeps priority. Targets that have only one possible assignment are chosen
//! without asking.

use tracing::{debug, trace};

use super::actions::{card_in_hand, require_priority, require_sorcery_timing, ActionHandler};
use super::payment;
use super::run::{Progress, Run};
use super::Engine;
use crate::cards::CardDefinition;
use crate::core::{Action, ActionKind, Component, EntityId, GameEvent, GameState};
use crate::decision::{CastProgress, Continuation, DecisionKind, DecisionResponse};
use crate::effects::{target_choice, validate_targets, TargetChoice};
use crate::error::{contract_violation, Result, RuleViolation};
use crate::stack::StackItem;
use crate::zones::{ZoneKey, ZonePosition};

pub(crate) struct CastSpell;

impl ActionHandler for CastSpell {
    fn validate(&self, engine: &Engine, state: &GameState, action: &Action) -> Result<()> {
        let ActionKind::CastSpell {
            card,
            targets,
            x,
            payment: strategy,
        } = &action.kind
        else {
            contract_violation("cast handler given another action");
        };
        let player = action.player;
        let def = card_in_hand(engine, state, player, *card)?;
        if def.is_land() {
            return Err(RuleViolation::LandNotCastable(*card));
        }
        require_priority(state, player)?;
        if !def.is_instant_speed() {
            require_sorcery_timing(state, player)?;
        }

        if x.map_or(false, |x| x > 0) && !def.cost.has_x() {
            return Err(RuleViolation::CannotPay(format!("{} has no X in its cost", def.name)));
        }
        let x_value = x.unwrap_or(0);
        if !payment::can_pay(engine, state, player, &def.cost, x_value, strategy) {
            return Err(RuleViolation::CannotPay(format!("{} for {}", def.cost, def.name)));
        }

        let view = engine.project(state);
        let requirements = def.spell_targets();
        match targets {
            Some(chosen) => validate_targets(state, &view, player, requirements, chosen, Some(*card)),
            None => match target_choice(state, &view, player, requirements, Some(*card)) {
                TargetChoice::Impossible => Err(RuleViolation::TargetCount(format!(
                    "{} has no legal targets",
                    def.name
                ))),
                _ => Ok(()),
            },
        }
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        let ActionKind::CastSpell {
            card,
            targets,
            x,
            payment: strategy,
        } = &action.kind
        else {
            contract_violation("cast handler given another action");
        };
        let player = action.player;
        if let Some(components) = run.state_mut().entity_mut(*card) {
            components.insert(Component::StackItem(StackItem::spell(player)));
        }
        run.move_entity(*card, ZoneKey::stack(), ZonePosition::Top);
        trace!(spell = %card, "moved to the stack");

        let progress = CastProgress {
            card: *card,
            player,
            x: *x,
            targets: targets.clone(),
            payment: strategy.clone(),
        };
        Ok(continue_cast(run, progress))
    }
}

/// Ask for the next open choice, or pay and finish.
fn continue_cast(run: &mut Run<'_>, mut progress: CastProgress) -> Progress {
    let card = progress.card;
    let player = progress.player;
    let Some(def) = run.definition_of(card) else {
        contract_violation(format!("{} is being cast without a definition", card));
    };

    if progress.x.is_none() {
        if !def.cost.has_x() {
            progress.x = Some(0);
        } else {
            let max = payment::max_x(run.engine(), run.state(), player, &def.cost, &progress.payment);
            return run.suspend(
                player,
                Some(card),
                format!("Choose X for {}", def.name),
                DecisionKind::ChooseNumber { min: 0, max },
                Continuation::CastSpell(progress),
            );
        }
    }

    if progress.targets.is_none() {
        let view = run.view();
        match target_choice(run.state(), &view, player, def.spell_targets(), Some(card)) {
            TargetChoice::Forced(targets) => progress.targets = Some(targets),
            TargetChoice::Ask(slots) => {
                return run.suspend(
                    player,
                    Some(card),
                    format!("Choose targets for {}", def.name),
                    DecisionKind::ChooseTargets { slots },
                    Continuation::CastSpell(progress),
                );
            }
            TargetChoice::Impossible => {
                abandon(run, card, def);
                return Progress::Done;
            }
        }
    }

    let x = progress.x.unwrap_or(0);
    if !payment::pay(run, player, &def.cost, x, &progress.payment) {
        abandon(run, card, def);
        return Progress::Done;
    }
    let targets = progress.targets.unwrap_or_default();
    run.update_stack_item(card, |item| {
        item.targets = targets;
        item.x = x;
    });
    debug!(spell = %card, player = %player, x, "cast");
    run.emit(GameEvent::SpellCast {
        spell: card,
        controller: player,
    });
    run.clear_passed();
    run.give_priority(Some(player));
    Progress::Done
}

/// A cast that can no longer be completed goes back to its owner's hand.
fn abandon(run: &mut Run<'_>, card: EntityId, def: &CardDefinition) {
    debug!(spell = %card, card = %def.name, "cast abandoned");
    if let Some(owner) = run.state().owner_of(card) {
        run.move_entity(card, ZoneKey::hand(owner), ZonePosition::Top);
    }
}

pub(crate) fn resume(run: &mut Run<'_>, mut progress: CastProgress, response: &DecisionResponse) -> Progress {
    match response {
        DecisionResponse::Number(x) if progress.x.is_none() => progress.x = Some(*x),
        DecisionResponse::Targets(targets) if progress.targets.is_none() => {
            progress.targets = Some(targets.clone());
        }
        other => contract_violation(format!("cast resumed with {:?}", other)),
    }
    continue_cast(run, progress)
}
