//! Triggered ability integration tests.
//!
//! Triggers are detected from the events of a transition and put on the
//! stack the next time a player would receive priority, in APNAP order.

mod common;

use ccg_rules::core::{Action, GameEvent};
use ccg_rules::decision::{DecisionKind, DecisionResponse};
use ccg_rules::stack::StackItemKind;
use ccg_rules::turn::Step;
use ccg_rules::zones::ZoneKind;

use common::*;

// =============================================================================
// Enters-the-Battlefield Triggers
// =============================================================================

/// The trigger goes on the stack after the creature resolves and its target
/// is chosen before anyone gets priority.
#[test]
fn test_enters_trigger_with_target() {
    let engine = engine();
    let mut table = Table::new(2);
    for _ in 0..3 {
        table.battlefield(P0, "Mountain");
    }
    let shaman = table.hand(P0, "Blisterstick Shaman");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast(P0, shaman)).state;
    let result = {
        let first = apply(&engine, &state, Action::pass(P0));
        apply(&engine, &first.state, Action::pass(P1))
    };
    let state = result.state;
    assert!(state.is_on_battlefield(shaman));
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::AbilityTriggered { source, .. } if *source == shaman)));

    let asked = state.pending_decision().expect("trigger target is asked for").clone();
    assert_eq!(asked.player, P0);
    assert!(matches!(asked.kind, DecisionKind::ChooseTargets { .. }));
    let ability = state.stack_top().expect("trigger is already on the stack");

    let state = apply(
        &engine,
        &state,
        Action::submit(P0, asked.id, DecisionResponse::Targets(vec![vec![player(P1)]])),
    )
    .state;
    assert_eq!(state.entity(ability).unwrap().stack_item().unwrap().targets, vec![vec![player(P1)]]);
    assert_eq!(state.priority(), Some(P0));

    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P1), 19);
    assert!(state.stack_is_empty());
}

#[test]
fn test_enters_trigger_without_target() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Forest");
    table.battlefield(P0, "Forest");
    let visionary = table.hand(P0, "Elvish Visionary");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast(P0, visionary)).state;
    let state = pass_round(&engine, &state);
    assert!(state.pending().is_none());
    assert_eq!(state.stack().len(), 1);
    assert!(state.hand(P0).is_empty());

    let state = pass_round(&engine, &state);
    assert_eq!(state.hand(P0).len(), 1);
}

// =============================================================================
// Ordering
// =============================================================================

/// One controller with two simultaneous triggers orders them.
#[test]
fn test_controller_orders_simultaneous_triggers() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Soul Warden");
    table.battlefield(P0, "Soul Warden");
    table.battlefield(P0, "Forest");
    table.battlefield(P0, "Forest");
    let bears = table.hand(P0, "Grizzly Bears");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast(P0, bears)).state;
    let state = pass_round(&engine, &state);
    let asked = state.pending_decision().expect("trigger order is asked for").clone();
    let DecisionKind::OrderObjects { objects } = asked.kind.clone() else {
        panic!("expected an order decision, got {:?}", asked.kind);
    };
    assert_eq!(objects.len(), 2);

    let order = vec![objects[1], objects[0]];
    let state = apply(&engine, &state, Action::submit(P0, asked.id, DecisionResponse::Order(order))).state;
    let stack: Vec<_> = state.stack().iter().copied().collect();
    assert_eq!(stack, vec![objects[1], objects[0]], "the first listed sits lowest");

    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P0), 21);
    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P0), 22);
    assert!(state.stack_is_empty());
}

/// The active player's triggers go on the stack first, so the other
/// player's resolve first.
#[test]
fn test_triggers_are_placed_in_apnap_order() {
    let engine = engine();
    let mut table = Table::new(2);
    let mine = table.battlefield(P0, "Soul Warden");
    let theirs = table.battlefield(P1, "Soul Warden");
    table.battlefield(P0, "Forest");
    table.battlefield(P0, "Forest");
    let bears = table.hand(P0, "Grizzly Bears");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast(P0, bears)).state;
    let state = pass_round(&engine, &state);
    assert!(state.pending().is_none());

    let stack = state.stack();
    assert_eq!(stack.len(), 2);
    let source_of = |id| match &state.entity(id).unwrap().stack_item().unwrap().kind {
        StackItemKind::TriggeredAbility { source, .. } => *source,
        other => panic!("unexpected stack item {:?}", other),
    };
    assert_eq!(source_of(stack[0]), mine);
    assert_eq!(source_of(stack[1]), theirs);

    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P1), 21);
    assert_eq!(state.life(P0), 20);
    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P0), 21);
}

// =============================================================================
// Upkeep Triggers
// =============================================================================

#[test]
fn test_upkeep_trigger_runs_each_upkeep() {
    let engine = engine();
    let mut table = Table::new(2).at(P1, Step::End);
    table.battlefield(P0, "Phyrexian Arena");
    let state = table.state();

    let state = pass_round(&engine, &state);
    assert_eq!(state.active_player(), P0);
    assert_eq!(state.step(), Step::Upkeep);
    assert_eq!(state.stack().len(), 1);

    let state = pass_round(&engine, &state);
    assert_eq!(state.step(), Step::Upkeep);
    assert_eq!(state.hand(P0).len(), 1);
    assert_eq!(state.life(P0), 19);
}

/// Only the active player's upkeep triggers.
#[test]
fn test_upkeep_trigger_waits_for_controller() {
    let engine = engine();
    let mut table = Table::new(2).at(P0, Step::End);
    table.battlefield(P0, "Phyrexian Arena");
    let state = table.state();

    let state = pass_round(&engine, &state);
    assert_eq!(state.active_player(), P1);
    assert_eq!(state.step(), Step::Upkeep);
    assert!(state.stack_is_empty());
}

// =============================================================================
// Tokens
// =============================================================================

/// Tokens entering together trigger together, and a token that leaves the
/// battlefield stops existing.
#[test]
fn test_tokens_trigger_and_vanish() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Soul Warden");
    table.battlefield(P0, "Plains");
    table.battlefield(P0, "Plains");
    let alarm = table.hand(P0, "Raise the Alarm");
    let shock = table.hand(P0, "Shock");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast(P0, alarm)).state;
    let state = pass_round(&engine, &state);
    let soldiers: Vec<_> = state
        .permanents_of(P0)
        .filter(|&id| state.card_name(id) == Some("Soldier"))
        .collect();
    assert_eq!(soldiers.len(), 2);

    let asked = state.pending_decision().expect("two warden triggers to order").clone();
    let DecisionKind::OrderObjects { objects } = asked.kind.clone() else {
        panic!("expected an order decision, got {:?}", asked.kind);
    };
    let state = apply(&engine, &state, Action::submit(P0, asked.id, DecisionResponse::Order(objects))).state;
    let state = pass_round(&engine, &state);
    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P0), 22);

    let (state, _) = state.with_card(P0, "Mountain", ZoneKind::Battlefield);
    let state = apply(&engine, &state, Action::cast_targeting(P0, shock, vec![vec![soldiers[0]]])).state;
    let state = pass_round(&engine, &state);
    assert!(state.entity(soldiers[0]).is_none());
    assert!(!state.graveyard(P0).contains(&soldiers[0]));
    assert!(state.is_on_battlefield(soldiers[1]));
}
