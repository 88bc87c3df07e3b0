//! Matching events against triggered abilities.
//!
//! Detection reads the events a transition emitted since the last scan and
//! queues a [`PendingTrigger`] for every ability whose condition matches.
//! Queued triggers are put on the stack the next time a player would
//! receive priority.

use tracing::trace;

use super::condition::{PendingTrigger, TriggerCondition};
use crate::core::{EntityId, GameEvent, PlayerId};
use crate::engine::Run;
use crate::turn::Step;
use crate::zones::ZoneKind;

/// Queue triggers for `source` whose condition is `condition`.
fn fire(
    run: &mut Run<'_>,
    source: EntityId,
    controller: PlayerId,
    condition: TriggerCondition,
    subject: Option<EntityId>,
) {
    let Some(def) = run.definition_of(source) else {
        return;
    };
    let matching: Vec<usize> = def
        .triggered
        .iter()
        .enumerate()
        .filter(|(_, ability)| ability.condition == condition)
        .map(|(index, _)| index)
        .collect();
    if matching.is_empty() {
        return;
    }
    let card = def.name.clone();
    for ability in matching {
        trace!(source = %source, ability, condition = ?condition, "triggered");
        run.state_mut().pending_triggers_mut().push_back(PendingTrigger {
            source,
            card: card.clone(),
            controller,
            ability,
            subject,
        });
    }
}

/// Fire `condition` for every permanent on the battlefield that passes `filter`.
fn fire_battlefield(
    run: &mut Run<'_>,
    condition: TriggerCondition,
    subject: Option<EntityId>,
    filter: impl Fn(EntityId, PlayerId) -> bool,
) {
    let watchers: Vec<(EntityId, PlayerId)> = run
        .state()
        .battlefield()
        .filter_map(|id| Some((id, run.state().controller_of(id)?)))
        .filter(|&(id, controller)| filter(id, controller))
        .collect();
    for (id, controller) in watchers {
        fire(run, id, controller, condition, subject);
    }
}

fn entered(run: &mut Run<'_>, entity: EntityId) {
    if !run.state().is_on_battlefield(entity) {
        return;
    }
    if let Some(controller) = run.state().controller_of(entity) {
        fire(run, entity, controller, TriggerCondition::EntersBattlefield, None);
    }
    if run.is_creature(entity) {
        fire_battlefield(run, TriggerCondition::AnotherCreatureEnters, Some(entity), |id, _| {
            id != entity
        });
    }
}

/// Scan new events and queue the triggers they cause.
pub(crate) fn detect(run: &mut Run<'_>) {
    for event in run.take_unscanned() {
        match event {
            GameEvent::ZoneChange {
                entity,
                from,
                to,
                controller,
            } => {
                if to.kind == ZoneKind::Battlefield {
                    entered(run, entity);
                } else if from.kind == ZoneKind::Battlefield
                    && to.kind == ZoneKind::Graveyard
                    && run.is_creature(entity)
                {
                    fire(run, entity, controller, TriggerCondition::Dies, None);
                }
            }
            GameEvent::TokenCreated { token, .. } => entered(run, token),
            GameEvent::StepChanged { step: Step::Upkeep } => {
                let active = run.state().active_player();
                fire_battlefield(run, TriggerCondition::BeginningOfYourUpkeep, None, |_, c| {
                    c == active
                });
            }
            GameEvent::SpellCast { spell, controller } => {
                fire_battlefield(run, TriggerCondition::YouCastSpell, Some(spell), |_, c| {
                    c == controller
                });
                fire_battlefield(run, TriggerCondition::OpponentCastsSpell, Some(spell), |_, c| {
                    c != controller
                });
            }
            GameEvent::AttackersDeclared { attackers, .. } => {
                for (attacker, defender) in attackers {
                    if let Some(controller) = run.state().controller_of(attacker) {
                        let subject = Some(EntityId::player(defender));
                        fire(run, attacker, controller, TriggerCondition::Attacks, subject);
                    }
                }
            }
            GameEvent::DamageDealt {
                source,
                target,
                combat: true,
                ..
            } => {
                if target.is_player(run.state().player_count()) && run.state().is_on_battlefield(source) {
                    if let Some(controller) = run.state().controller_of(source) {
                        fire(
                            run,
                            source,
                            controller,
                            TriggerCondition::DealsCombatDamageToPlayer,
                            Some(target),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}
