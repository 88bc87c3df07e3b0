//! Putting queued triggers on the stack.
//!
//! Triggers are put on the stack in APNAP order: all of the active player's
//! first, then each other player's in turn order, so the last player's
//! abilities resolve first. A controller with two or more triggers at once
//! orders them; targets are chosen afterwards, one ability at a time.
//! A trigger whose targets cannot be chosen is removed without being put on
//! the stack.

use tracing::{debug, trace};

use super::condition::PendingTrigger;
use crate::core::{EntityId, GameEvent, PlayerId};
use crate::decision::{Continuation, DecisionKind, DecisionResponse, TriggerPlacement};
use crate::effects::{target_choice, TargetChoice, TargetRequirement};
use crate::engine::{Progress, Run};
use crate::error::contract_violation;
use crate::stack::{StackItem, StackItemKind};
use crate::zones::ZoneKey;

fn requirements(run: &Run<'_>, card: &str, ability: usize) -> Vec<TargetRequirement> {
    run.engine()
        .catalog()
        .definition_for(card)
        .and_then(|def| def.triggered.get(ability))
        .map(|a| a.targets.clone())
        .unwrap_or_default()
}

/// Drain the trigger queue onto the stack.
pub(crate) fn place(run: &mut Run<'_>) -> Progress {
    let queued: Vec<PendingTrigger> = std::mem::take(run.state_mut().pending_triggers_mut())
        .into_iter()
        .collect();
    if queued.is_empty() {
        return Progress::Done;
    }

    let state = run.state();
    let order: Vec<PlayerId> = PlayerId::apnap(state.active_player(), state.player_count())
        .filter(|&p| !state.has_lost(p))
        .collect();

    let mut placement = TriggerPlacement::default();
    for player in order {
        let mut group = Vec::new();
        for trigger in queued.iter().filter(|t| t.controller == player) {
            let reqs = requirements(run, &trigger.card, trigger.ability);
            let view = run.view();
            let choice = target_choice(run.state(), &view, player, &reqs, Some(trigger.source));
            let needs_targets = matches!(choice, TargetChoice::Ask(_));
            let targets = match choice {
                TargetChoice::Impossible => {
                    debug!(source = %trigger.source, ability = trigger.ability, "trigger has no legal targets");
                    continue;
                }
                TargetChoice::Forced(targets) => targets,
                TargetChoice::Ask(_) => Vec::new(),
            };
            let kind = StackItemKind::TriggeredAbility {
                source: trigger.source,
                index: trigger.ability,
            };
            let id = run.create_ability(&trigger.card, StackItem::ability(kind, player, targets));
            run.emit(GameEvent::AbilityTriggered {
                ability: id,
                source: trigger.source,
                controller: player,
            });
            trace!(ability = %id, source = %trigger.source, "trigger put on the stack");
            if needs_targets {
                placement.targeting.push(id);
            }
            group.push(id);
        }
        if group.len() >= 2 {
            placement.order_groups.push(group);
        }
    }

    continue_placement(run, placement)
}

fn controller_of_item(run: &Run<'_>, id: EntityId) -> PlayerId {
    run.state()
        .entity(id)
        .and_then(|c| c.stack_item())
        .map(|item| item.controller)
        .unwrap_or_else(|| contract_violation(format!("{} is not a stack item", id)))
}

/// Ask for whatever the placement still needs, or finish it.
fn continue_placement(run: &mut Run<'_>, mut placement: TriggerPlacement) -> Progress {
    if let Some(group) = placement.order_groups.first() {
        let player = controller_of_item(run, group[0]);
        let kind = DecisionKind::OrderObjects {
            objects: group.clone(),
        };
        return run.suspend(
            player,
            None,
            "Order your triggered abilities; the first listed is put on the stack first".into(),
            kind,
            Continuation::PlaceTriggers(placement),
        );
    }

    while let Some(&id) = placement.targeting.first() {
        let Some(item) = run.state().entity(id).and_then(|c| c.stack_item()).cloned() else {
            placement.targeting.remove(0);
            continue;
        };
        let StackItemKind::TriggeredAbility { source, index } = item.kind else {
            contract_violation(format!("{} is not a triggered ability", id));
        };
        let Some(card) = run.state().card_name(id).map(str::to_string) else {
            contract_violation(format!("{} has no card name", id));
        };
        let reqs = requirements(run, &card, index);
        let view = run.view();
        match target_choice(run.state(), &view, item.controller, &reqs, Some(source)) {
            TargetChoice::Forced(targets) => {
                run.update_stack_item(id, |item| item.targets = targets);
                placement.targeting.remove(0);
            }
            TargetChoice::Impossible => {
                debug!(ability = %id, "trigger lost its targets before they were chosen");
                run.state_mut().forget_entity(id);
                placement.targeting.remove(0);
            }
            TargetChoice::Ask(slots) => {
                return run.suspend(
                    item.controller,
                    Some(source),
                    format!("Choose targets for {}", card),
                    DecisionKind::ChooseTargets { slots },
                    Continuation::PlaceTriggers(placement),
                );
            }
        }
    }

    run.clear_passed();
    Progress::Done
}

/// Apply an ordering or a target choice and carry on placing.
pub(crate) fn resume(
    run: &mut Run<'_>,
    mut placement: TriggerPlacement,
    response: &DecisionResponse,
) -> Progress {
    match response {
        DecisionResponse::Order(order) if !placement.order_groups.is_empty() => {
            placement.order_groups.remove(0);
            reorder_segment(run, order);
        }
        DecisionResponse::Targets(targets) if !placement.targeting.is_empty() => {
            let id = placement.targeting.remove(0);
            let targets = targets.clone();
            run.update_stack_item(id, |item| item.targets = targets);
        }
        other => contract_violation(format!("trigger placement resumed with {:?}", other)),
    }
    continue_placement(run, placement)
}

/// Rearrange the stack positions held by `order`'s members so the first
/// listed sits lowest.
fn reorder_segment(run: &mut Run<'_>, order: &[EntityId]) {
    let mut stack: Vec<EntityId> = run.state().stack().iter().copied().collect();
    let positions: Vec<usize> = stack
        .iter()
        .enumerate()
        .filter(|(_, id)| order.contains(id))
        .map(|(i, _)| i)
        .collect();
    for (&position, &id) in positions.iter().zip(order) {
        stack[position] = id;
    }
    run.state_mut()
        .zones_mut()
        .reorder(ZoneKey::stack(), stack.into_iter().collect());
}
