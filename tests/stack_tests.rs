//! Stack and priority integration tests.
//!
//! These tests verify casting, responding, last-in-first-out resolution,
//! fizzling and the pass-in-succession rule through `Engine::process`.

mod common;

use ccg_rules::core::{Action, ActionKind, GameEvent};
use ccg_rules::decision::{DecisionKind, DecisionResponse};
use ccg_rules::turn::Step;
use ccg_rules::zones::ZoneKind;
use ccg_rules::{PaymentStrategy, RuleViolation};

use common::*;

// =============================================================================
// Casting and Resolution
// =============================================================================

/// A spell resolves once every player passes in succession.
#[test]
fn test_spell_resolves_after_all_pass() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Mountain");
    let bolt = table.hand(P0, "Lightning Bolt");
    let state = table.state();

    let cast = apply(
        &engine,
        &state,
        Action::cast_targeting(P0, bolt, vec![vec![player(P1)]]),
    );
    assert_eq!(cast.state.stack_top(), Some(bolt));
    assert_eq!(cast.state.priority(), Some(P0));
    assert!(cast
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::SpellCast { spell, .. } if *spell == bolt)));

    let after_one = pass(&engine, &cast.state);
    assert_eq!(after_one.priority(), Some(P1));
    assert_eq!(after_one.life(P1), 20);

    let resolved = pass(&engine, &after_one);
    assert_eq!(resolved.life(P1), 17);
    assert!(resolved.stack_is_empty());
    assert!(resolved.graveyard(P0).contains(&bolt));
    // The active player receives priority after a resolution.
    assert_eq!(resolved.priority(), Some(P0));
}

/// The last spell cast resolves first.
#[test]
fn test_stack_is_last_in_first_out() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Mountain");
    table.battlefield(P1, "Mountain");
    let bolt = table.hand(P0, "Lightning Bolt");
    let shock = table.hand(P1, "Shock");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast_targeting(P0, bolt, vec![vec![player(P1)]])).state;
    let state = pass(&engine, &state);
    let state = apply(&engine, &state, Action::cast_targeting(P1, shock, vec![vec![player(P0)]])).state;
    assert_eq!(state.stack().len(), 2);
    assert_eq!(state.stack_top(), Some(shock));

    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P0), 18, "the response resolves first");
    assert_eq!(state.life(P1), 20);
    assert_eq!(state.stack_top(), Some(bolt));

    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P1), 17);
    assert!(state.stack_is_empty());
}

/// Any action other than passing restarts the round of passes.
#[test]
fn test_action_resets_passes() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P1, "Mountain");
    let shock = table.hand(P1, "Shock");
    let state = table.state();

    let state = pass(&engine, &state);
    assert!(state.has_passed(P0));
    assert_eq!(state.priority(), Some(P1));

    let state = apply(&engine, &state, Action::cast_targeting(P1, shock, vec![vec![player(P0)]])).state;
    assert!(!state.has_passed(P0));
    assert_eq!(state.priority(), Some(P1));

    // P1 passing hands priority back rather than resolving.
    let state = pass(&engine, &state);
    assert_eq!(state.priority(), Some(P0));
    assert_eq!(state.life(P0), 20);
    assert_eq!(state.stack_top(), Some(shock));
}

/// All players passing with an empty stack ends the step.
#[test]
fn test_empty_stack_passes_advance_step() {
    let engine = engine();
    let state = Table::new(2).state();

    let state = pass_round(&engine, &state);
    assert_eq!(state.step(), Step::BeginCombat);
    assert_eq!(state.priority(), Some(P0));
}

/// A spell whose only target became illegal does nothing and goes to the graveyard.
#[test]
fn test_spell_fizzles_when_target_is_gone() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Forest");
    table.battlefield(P1, "Mountain");
    let bears = table.battlefield(P0, "Grizzly Bears");
    let growth = table.hand(P0, "Giant Growth");
    let bolt = table.hand(P1, "Lightning Bolt");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast_targeting(P0, growth, vec![vec![bears]])).state;
    let state = pass(&engine, &state);
    let state = apply(&engine, &state, Action::cast_targeting(P1, bolt, vec![vec![bears]])).state;

    let state = pass_round(&engine, &state);
    assert!(state.graveyard(P0).contains(&bears), "three damage kills the bears");
    assert_eq!(state.stack_top(), Some(growth));

    let p0_passes = pass(&engine, &state);
    let holder = p0_passes.priority().unwrap();
    let last = apply(&engine, &p0_passes, Action::pass(holder));
    assert!(last
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::SpellFizzled { spell } if *spell == growth)));
    assert!(!last
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::SpellResolved { spell } if *spell == growth)));
    assert!(last.state.graveyard(P0).contains(&growth));
}

/// A counterspell removes its target from the stack.
#[test]
fn test_counterspell() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Mountain");
    table.battlefield(P1, "Island");
    table.battlefield(P1, "Island");
    let bolt = table.hand(P0, "Lightning Bolt");
    let cancel = table.hand(P1, "Cancel");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast_targeting(P0, bolt, vec![vec![player(P1)]])).state;
    let state = pass(&engine, &state);
    let state = apply(&engine, &state, Action::cast_targeting(P1, cancel, vec![vec![bolt]])).state;

    let state = pass_round(&engine, &state);
    assert!(state.stack_is_empty());
    assert_eq!(state.life(P1), 20);
    assert!(state.graveyard(P0).contains(&bolt));
    assert!(state.graveyard(P1).contains(&cancel));
}

/// A permanent spell enters the battlefield under its caster's control.
#[test]
fn test_creature_spell_enters_battlefield() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Forest");
    table.battlefield(P0, "Forest");
    let bears = table.hand(P0, "Grizzly Bears");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast(P0, bears)).state;
    let state = pass_round(&engine, &state);
    assert!(state.is_on_battlefield(bears));
    assert_eq!(state.controller_of(bears), Some(P0));
    assert!(state.entity(bears).unwrap().is_summoning_sick());
}

// =============================================================================
// Casting Decisions
// =============================================================================

/// Targets left open are asked for when there is more than one choice.
#[test]
fn test_cast_asks_for_targets() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Mountain");
    let bolt = table.hand(P0, "Lightning Bolt");
    let state = table.state();

    let paused = apply(&engine, &state, Action::cast(P0, bolt)).state;
    let decision = paused.pending_decision().expect("targets are asked for").clone();
    assert_eq!(decision.player, P0);
    let DecisionKind::ChooseTargets { slots } = &decision.kind else {
        panic!("expected a target decision, got {:?}", decision.kind);
    };
    assert!(slots[0].legal.contains(&player(P1)));

    // Nothing else is accepted while the decision is pending.
    assert_eq!(
        engine.validate(&paused, &Action::pass(P0)),
        Err(RuleViolation::DecisionPending(decision.id))
    );

    let state = apply(
        &engine,
        &paused,
        Action::submit(P0, decision.id, DecisionResponse::Targets(vec![vec![player(P1)]])),
    )
    .state;
    assert!(state.pending().is_none());
    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P1), 17);
}

/// X is asked for with the largest payable value as the maximum.
#[test]
fn test_fireball_asks_for_x() {
    let engine = engine();
    let mut table = Table::new(2);
    for _ in 0..4 {
        table.battlefield(P0, "Mountain");
    }
    let fireball = table.hand(P0, "Fireball");
    let state = table.state();

    let paused = apply(&engine, &state, Action::cast_targeting(P0, fireball, vec![vec![player(P1)]])).state;
    let decision = paused.pending_decision().unwrap().clone();
    assert_eq!(decision.kind, DecisionKind::ChooseNumber { min: 0, max: 3 });

    let too_big = Action::submit(P0, decision.id, DecisionResponse::Number(4));
    assert!(matches!(
        engine.validate(&paused, &too_big),
        Err(RuleViolation::InvalidResponse(_))
    ));

    let state = apply(&engine, &paused, Action::submit(P0, decision.id, DecisionResponse::Number(3))).state;
    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P1), 17);
}

/// With named sources, the largest X offered is what those sources cover.
#[test]
fn test_x_is_bounded_by_named_sources() {
    let engine = engine();
    let mut table = Table::new(2);
    let lands: Vec<_> = (0..4).map(|_| table.battlefield(P0, "Mountain")).collect();
    let fireball = table.hand(P0, "Fireball");
    let state = table.state();

    let action = Action::new(
        P0,
        ActionKind::CastSpell {
            card: fireball,
            targets: Some(vec![vec![player(P1)]]),
            x: None,
            payment: PaymentStrategy::Sources(lands[..3].to_vec()),
        },
    );
    let paused = apply(&engine, &state, action).state;
    let decision = paused.pending_decision().unwrap().clone();
    assert_eq!(decision.kind, DecisionKind::ChooseNumber { min: 0, max: 2 });

    let state = apply(&engine, &paused, Action::submit(P0, decision.id, DecisionResponse::Number(2))).state;
    assert!(!state.entity(lands[3]).unwrap().is_tapped());
    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P1), 18);
}

/// Casting with sources named explicitly taps exactly those sources.
#[test]
fn test_explicit_payment_sources() {
    let engine = engine();
    let mut table = Table::new(2);
    let first = table.battlefield(P0, "Mountain");
    let second = table.battlefield(P0, "Mountain");
    let bolt = table.hand(P0, "Lightning Bolt");
    let state = table.state();

    let action = Action::new(
        P0,
        ActionKind::CastSpell {
            card: bolt,
            targets: Some(vec![vec![player(P1)]]),
            x: None,
            payment: PaymentStrategy::Sources(vec![second]),
        },
    );
    let state = apply(&engine, &state, action).state;
    assert!(!state.entity(first).unwrap().is_tapped());
    assert!(state.entity(second).unwrap().is_tapped());
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_cannot_cast_without_priority() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P1, "Mountain");
    let shock = table.hand(P1, "Shock");
    let state = table.state();

    let result = engine.validate(&state, &Action::cast_targeting(P1, shock, vec![vec![player(P0)]]));
    assert_eq!(result, Err(RuleViolation::NotYourPriority(P1)));
}

#[test]
fn test_cannot_cast_unaffordable_spell() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Forest");
    let bolt = table.hand(P0, "Lightning Bolt");
    let state = table.state();

    let result = engine.process(&state, &Action::cast_targeting(P0, bolt, vec![vec![player(P1)]]));
    assert!(matches!(result, Err(RuleViolation::CannotPay(_))));
}

/// A sorcery needs an empty stack during its controller's main phase.
#[test]
fn test_sorcery_timing() {
    let engine = engine();
    let mut table = Table::new(2);
    for _ in 0..3 {
        table.battlefield(P0, "Island");
    }
    table.battlefield(P1, "Mountain");
    table.battlefield(P1, "Island");
    table.battlefield(P1, "Island");
    table.battlefield(P1, "Island");
    let divination = table.hand(P0, "Divination");
    let other = table.hand(P1, "Divination");
    let bolt = table.hand(P1, "Lightning Bolt");
    let state = table.state();

    let state = pass(&engine, &state);
    assert!(matches!(
        engine.validate(&state, &Action::cast(P1, other)),
        Err(RuleViolation::WrongTiming(_))
    ));

    let state = apply(&engine, &state, Action::cast_targeting(P1, bolt, vec![vec![player(P0)]])).state;
    let state = pass(&engine, &state);
    assert_eq!(state.priority(), Some(P0));
    assert!(matches!(
        engine.validate(&state, &Action::cast(P0, divination)),
        Err(RuleViolation::WrongTiming(_))
    ));
}

/// A rejected action leaves the input snapshot untouched.
#[test]
fn test_rejection_changes_nothing() {
    let engine = engine();
    let mut table = Table::new(2);
    let forest = table.hand(P0, "Forest");
    let second = table.hand(P0, "Forest");
    let state = table.state();
    let before = state.clone();

    let state = apply(&engine, &state, Action::new(P0, ActionKind::PlayLand { card: forest })).state;
    let again = state.clone();
    let result = engine.process(&state, &Action::new(P0, ActionKind::PlayLand { card: second }));
    assert_eq!(result, Err(RuleViolation::LandLimit));
    assert_eq!(state, again);
    assert_eq!(before.zone_of(forest).map(|z| z.kind), Some(ZoneKind::Hand));
}
