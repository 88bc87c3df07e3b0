//! Decision and continuation integration tests.
//!
//! A decision asked in the middle of resolution pauses the game in a plain
//! snapshot. These tests answer decisions, nest them, and carry paused
//! snapshots through bincode into a fresh engine.

mod common;

use ccg_rules::cards::{Color, Mana};
use ccg_rules::core::{Action, ActionKind, GameEvent, GameState};
use ccg_rules::decision::{DecisionId, DecisionKind, DecisionResponse};
use ccg_rules::{GameResult, RuleViolation};

use common::*;

/// P0 with Reckless Offering in hand and two creatures that could be sacrificed.
fn offering_table() -> (GameState, ccg_rules::EntityId, ccg_rules::EntityId, ccg_rules::EntityId) {
    let mut table = Table::new(2);
    table.battlefield(P0, "Swamp");
    table.battlefield(P0, "Swamp");
    let bears = table.battlefield(P0, "Grizzly Bears");
    let elves = table.battlefield(P0, "Llanowar Elves");
    let offering = table.hand(P0, "Reckless Offering");
    (table.state(), bears, elves, offering)
}

// =============================================================================
// Nested Decisions During Resolution
// =============================================================================

/// Sacrifice, then a target chosen on resolution: two decisions in a row,
/// each resumed from a snapshot that went through bincode.
#[test]
fn test_nested_decisions_survive_serialization() {
    let (state, bears, elves, offering) = offering_table();
    let engine = engine();

    let state = apply(&engine, &state, Action::cast(P0, offering)).state;
    let state = pass_round(&engine, &state);

    let sacrifice = state.pending_decision().expect("sacrifice is asked for").clone();
    assert_eq!(sacrifice.player, P0);
    assert_eq!(
        sacrifice.kind,
        DecisionKind::ChooseCards {
            legal: vec![bears, elves],
            min: 1,
            max: 1
        }
    );
    assert_eq!(state.stack_top(), Some(offering), "still on the stack while paused");

    let bytes = state.to_bytes().unwrap();
    let restored = GameState::from_bytes(&bytes).unwrap();
    assert_eq!(restored, state);

    // A different engine instance built from the same catalog continues the
    // game exactly as the original snapshot would.
    let other = common::engine();
    let choose_bears = Action::submit(P0, sacrifice.id, DecisionResponse::Cards(vec![bears]));
    assert_eq!(other.process(&restored, &choose_bears), engine.process(&state, &choose_bears));
    let state = apply(&other, &restored, choose_bears).state;
    assert!(state.graveyard(P0).contains(&bears));

    let target = state.pending_decision().expect("damage target is asked for").clone();
    assert_ne!(target.id, sacrifice.id);
    let DecisionKind::ChooseTargets { slots } = &target.kind else {
        panic!("expected a target decision, got {:?}", target.kind);
    };
    assert!(slots[0].legal.contains(&elves));
    assert!(!slots[0].legal.contains(&bears));

    let restored = GameState::from_bytes(&state.to_bytes().unwrap()).unwrap();
    let aim = Action::submit(P0, target.id, DecisionResponse::Targets(vec![vec![player(P1)]]));
    assert_eq!(other.process(&restored, &aim), engine.process(&state, &aim));
    let done = apply(&other, &restored, aim);
    assert_eq!(done.state.life(P1), 18);
    assert!(done.state.pending().is_none());
    assert!(done.state.stack_is_empty());
    assert!(done.state.graveyard(P0).contains(&offering));
    assert_eq!(done.state.priority(), Some(P0));
    assert!(done
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::DecisionSubmitted { decision, .. } if *decision == target.id)));
}

/// With a single candidate the sacrifice is made without asking.
#[test]
fn test_forced_sacrifice_is_not_asked() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Swamp");
    table.battlefield(P0, "Swamp");
    let bears = table.battlefield(P0, "Grizzly Bears");
    let offering = table.hand(P0, "Reckless Offering");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast(P0, offering)).state;
    let state = pass_round(&engine, &state);

    assert!(state.graveyard(P0).contains(&bears));
    let decision = state.pending_decision().expect("only the target is asked for");
    assert!(matches!(decision.kind, DecisionKind::ChooseTargets { .. }));
}

/// "If you do" skips the damage when nothing was sacrificed.
#[test]
fn test_if_you_do_without_sacrifice() {
    let engine = engine();
    let mut table = Table::new(2);
    table.battlefield(P0, "Swamp");
    table.battlefield(P0, "Swamp");
    let offering = table.hand(P0, "Reckless Offering");
    let state = table.state();

    let state = apply(&engine, &state, Action::cast(P0, offering)).state;
    let state = pass_round(&engine, &state);

    assert!(state.pending().is_none());
    assert_eq!(state.life(P0), 20);
    assert_eq!(state.life(P1), 20);
    assert!(state.graveyard(P0).contains(&offering));
}

// =============================================================================
// Response Validation
// =============================================================================

#[test]
fn test_response_checks() {
    let (state, bears, _elves, offering) = offering_table();
    let engine = engine();
    let state = apply(&engine, &state, Action::cast(P0, offering)).state;
    let state = pass_round(&engine, &state);
    let asked = state.pending_decision().unwrap().clone();

    let wrong_id = DecisionId(asked.id.0 + 1);
    assert_eq!(
        engine.validate(&state, &Action::submit(P0, wrong_id, DecisionResponse::Cards(vec![bears]))),
        Err(RuleViolation::DecisionMismatch {
            expected: asked.id,
            got: wrong_id
        })
    );
    assert!(matches!(
        engine.validate(&state, &Action::submit(P1, asked.id, DecisionResponse::Cards(vec![bears]))),
        Err(RuleViolation::WrongDecisionPlayer { .. })
    ));
    assert!(matches!(
        engine.validate(&state, &Action::submit(P0, asked.id, DecisionResponse::Cards(vec![]))),
        Err(RuleViolation::InvalidResponse(_))
    ));
    assert!(matches!(
        engine.validate(&state, &Action::submit(P0, asked.id, DecisionResponse::YesNo(true))),
        Err(RuleViolation::InvalidResponse(_))
    ));
    assert!(matches!(
        engine.validate(&state, &Action::submit(P0, asked.id, DecisionResponse::Cards(vec![player(P1)]))),
        Err(RuleViolation::InvalidResponse(_))
    ));
}

#[test]
fn test_submit_without_pending_decision() {
    let engine = engine();
    let state = Table::new(2).state();
    let action = Action::submit(P0, DecisionId(1), DecisionResponse::YesNo(true));
    assert_eq!(engine.validate(&state, &action), Err(RuleViolation::NoPendingDecision));
}

/// The owner of a pending decision is offered its sample answers.
#[test]
fn test_legal_actions_while_paused() {
    let (state, _bears, _elves, offering) = offering_table();
    let engine = engine();
    let state = apply(&engine, &state, Action::cast(P0, offering)).state;
    let state = pass_round(&engine, &state);
    let asked = state.pending_decision().unwrap().id;

    let p0 = engine.legal_actions(&state, P0);
    assert!(p0
        .iter()
        .any(|a| matches!(&a.kind, ActionKind::SubmitDecision { decision, .. } if *decision == asked)));
    for action in &p0 {
        assert!(matches!(action.kind, ActionKind::SubmitDecision { .. } | ActionKind::Concede));
    }
    let p1 = engine.legal_actions(&state, P1);
    assert_eq!(p1, vec![Action::new(P1, ActionKind::Concede)]);
}

// =============================================================================
// Activated Abilities
// =============================================================================

/// A tap ability goes on the stack as its own object and is asked for targets.
#[test]
fn test_activated_ability_uses_stack() {
    let engine = engine();
    let mut table = Table::new(2);
    let pyromancer = table.battlefield(P0, "Prodigal Pyromancer");
    let state = table.state();

    let paused = apply(&engine, &state, Action::activate(P0, pyromancer, 0)).state;
    assert!(paused.entity(pyromancer).unwrap().is_tapped());
    let asked = paused.pending_decision().unwrap().clone();

    let state = apply(
        &engine,
        &paused,
        Action::submit(P0, asked.id, DecisionResponse::Targets(vec![vec![player(P1)]])),
    )
    .state;
    let ability = state.stack_top().expect("ability on the stack");
    assert_ne!(ability, pyromancer);
    assert_eq!(state.card_name(ability), Some("Prodigal Pyromancer"));

    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P1), 19);
    assert!(state.entity(ability).is_none(), "a resolved ability ceases to exist");
    assert!(state.is_on_battlefield(pyromancer));
}

#[test]
fn test_tapped_source_cannot_activate() {
    let engine = engine();
    let mut table = Table::new(2);
    let pyromancer = table.battlefield(P0, "Prodigal Pyromancer");
    let state = table.state();

    let action = Action::new(
        P0,
        ActionKind::ActivateAbility {
            source: pyromancer,
            ability: 0,
            targets: Some(vec![vec![player(P1)]]),
        },
    );
    let state = apply(&engine, &state, action.clone()).state;
    assert_eq!(engine.validate(&state, &action), Err(RuleViolation::Tapped(pyromancer)));
    assert_eq!(
        engine.validate(&state, &Action::activate(P0, pyromancer, 3)),
        Err(RuleViolation::NoSuchAbility {
            source_id: pyromancer,
            index: 3
        })
    );
    assert_eq!(
        engine.validate(&state, &Action::activate(P1, pyromancer, 0)),
        Err(RuleViolation::NotYourPermanent(pyromancer))
    );
}

/// A mana ability resolves immediately and never touches the stack.
#[test]
fn test_mana_ability_skips_stack() {
    let engine = engine();
    let mut table = Table::new(2);
    let elves = table.battlefield(P0, "Llanowar Elves");
    let state = table.state();

    let result = apply(&engine, &state, Action::activate(P0, elves, 0));
    assert!(result.state.stack_is_empty());
    assert_eq!(result.state.player(P0).mana_pool.amount(Mana::Colored(Color::Green)), 1);
    assert_eq!(result.state.priority(), Some(P0));
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::ManaAbilityActivated { source, .. } if *source == elves)));
}

/// With several creatures to choose from, the sacrifice cost is a decision
/// and paying it happens before targets are chosen.
#[test]
fn test_sacrifice_cost_decision() {
    let engine = engine();
    let mut table = Table::new(2);
    let bombardment = table.battlefield(P0, "Goblin Bombardment");
    let bears = table.battlefield(P0, "Grizzly Bears");
    let elves = table.battlefield(P0, "Llanowar Elves");
    let state = table.state();

    let action = Action::new(
        P0,
        ActionKind::ActivateAbility {
            source: bombardment,
            ability: 0,
            targets: Some(vec![vec![player(P1)]]),
        },
    );
    let paused = apply(&engine, &state, action).state;
    let asked = paused.pending_decision().unwrap().clone();
    assert_eq!(
        asked.kind,
        DecisionKind::ChooseCards {
            legal: vec![bears, elves],
            min: 1,
            max: 1
        }
    );

    let state = apply(&engine, &paused, Action::submit(P0, asked.id, DecisionResponse::Cards(vec![elves]))).state;
    assert!(state.graveyard(P0).contains(&elves));
    assert!(state.is_on_battlefield(bears));
    assert!(!state.stack_is_empty());

    let state = pass_round(&engine, &state);
    assert_eq!(state.life(P1), 19);
}

#[test]
fn test_sacrifice_cost_needs_a_creature() {
    let engine = engine();
    let mut table = Table::new(2);
    let bombardment = table.battlefield(P0, "Goblin Bombardment");
    let state = table.state();

    assert_eq!(
        engine.validate(&state, &Action::activate(P0, bombardment, 0)),
        Err(RuleViolation::CannotSacrifice)
    );
}

// =============================================================================
// Concession
// =============================================================================

/// Conceding is accepted even while someone else's decision is pending, and
/// ends a two-player game.
#[test]
fn test_concede_while_paused() {
    let (state, _bears, _elves, offering) = offering_table();
    let engine = engine();
    let state = apply(&engine, &state, Action::cast(P0, offering)).state;
    let state = pass_round(&engine, &state);
    assert!(state.pending().is_some());

    let result = apply(&engine, &state, Action::new(P1, ActionKind::Concede));
    assert_eq!(result.state.outcome(), Some(&GameResult::Winner(P0)));
    assert!(result.state.pending().is_none());
    assert_eq!(engine.validate(&result.state, &Action::pass(P0)), Err(RuleViolation::GameOver));
    assert!(engine.legal_actions(&result.state, P0).is_empty());
}

// =============================================================================
// Wire Format
// =============================================================================

/// Actions and responses travel as JSON between a host and its clients.
#[test]
fn test_actions_round_trip_through_json() {
    let (state, bears, _elves, offering) = offering_table();
    let engine = engine();
    let state = apply(&engine, &state, Action::cast(P0, offering)).state;
    let state = pass_round(&engine, &state);
    let asked = state.pending_decision().unwrap().clone();

    let action = Action::submit(P0, asked.id, DecisionResponse::Cards(vec![bears]));
    let json = serde_json::to_string(&action).unwrap();
    let decoded: Action = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, action);

    let kind_json = serde_json::to_string(&asked.kind).unwrap();
    let kind: DecisionKind = serde_json::from_str(&kind_json).unwrap();
    assert_eq!(kind, asked.kind);

    let continued = apply(&engine, &state, decoded).state;
    assert!(continued.graveyard(P0).contains(&bears));
}
