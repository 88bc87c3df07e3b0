//! Game creation and mulligan integration tests.

mod common;

use ccg_rules::core::{Action, ActionKind, GameConfig, GameEvent, MulliganRule, PlayerId};
use ccg_rules::engine::{GameSetup, Transition};
use ccg_rules::turn::Step;
use ccg_rules::{RuleViolation, SetupError};

use common::*;

fn deck() -> Vec<&'static str> {
    let mut cards = vec!["Forest"; 8];
    cards.extend(["Mountain"; 6]);
    cards.extend(["Grizzly Bears", "Giant Spider", "Lightning Bolt", "Shock", "Divination", "Cancel"]);
    cards
}

fn setup(config: GameConfig) -> GameSetup {
    let mut setup = GameSetup::new(config.clone());
    for _ in 0..config.player_count {
        setup = setup.with_deck(deck());
    }
    setup
}

fn build(setup: &GameSetup) -> Transition {
    match setup.build(&engine()) {
        Ok(transition) => transition,
        Err(err) => panic!("setup failed: {}", err),
    }
}

// =============================================================================
// Opening State
// =============================================================================

#[test]
fn test_without_mulligan_game_starts_immediately() {
    let config = GameConfig::new(2).with_mulligan(MulliganRule::None).with_seed(3);
    let state = build(&setup(config)).state;

    assert!(state.mulligan().is_none());
    assert_eq!(state.turn_number(), 1);
    assert_eq!(state.active_player(), P0);
    assert_eq!(state.step(), Step::Upkeep);
    assert_eq!(state.priority(), Some(P0));
    for player in [P0, P1] {
        assert_eq!(state.hand(player).len(), 7);
        assert_eq!(state.library(player).len(), deck().len() - 7);
        assert_eq!(state.life(player), 20);
    }
}

/// The starting player skips the first draw; everyone else draws normally.
#[test]
fn test_first_draw_is_skipped() {
    let engine = engine();
    let config = GameConfig::new(2).with_mulligan(MulliganRule::None);
    let state = setup(config).build(&engine).unwrap().state;

    let state = pass_round(&engine, &state);
    assert_eq!(state.step(), Step::Draw);
    assert_eq!(state.hand(P0).len(), 7);

    let state = pass_while(&engine, &state, |s| s.turn_number() == 1 || s.step() != Step::Draw);
    assert_eq!(state.active_player(), P1);
    assert_eq!(state.hand(P1).len(), 8);
}

#[test]
fn test_configured_opening() {
    let config = GameConfig::new(3)
        .with_mulligan(MulliganRule::None)
        .with_starting_life(40)
        .with_starting_hand_size(5);
    let state = build(&setup(config).with_starting_player(PlayerId::new(2))).state;

    assert_eq!(state.active_player(), PlayerId::new(2));
    assert_eq!(state.priority(), Some(PlayerId::new(2)));
    for player in state.player_ids() {
        assert_eq!(state.life(player), 40);
        assert_eq!(state.hand(player).len(), 5);
    }
}

#[test]
fn test_same_seed_same_game() {
    let config = GameConfig::new(2).with_seed(11);
    let first = build(&setup(config.clone())).state;
    let second = build(&setup(config)).state;
    assert_eq!(first, second);

    let other = build(&setup(GameConfig::new(2).with_seed(12))).state;
    assert_ne!(first.library(P0), other.library(P0));
}

#[test]
fn test_setup_errors() {
    let engine = engine();

    let short = GameSetup::new(GameConfig::new(3)).with_deck(deck()).with_deck(deck());
    assert_eq!(
        short.build(&engine).err(),
        Some(SetupError::DeckCount { expected: 3, got: 2 })
    );

    let unknown = GameSetup::new(GameConfig::new(2))
        .with_deck(deck())
        .with_deck(vec!["Forest", "Black Lotus"]);
    assert_eq!(
        unknown.build(&engine).err(),
        Some(SetupError::UnknownCard("Black Lotus".into()))
    );

    let small = GameSetup::new(GameConfig::new(2))
        .with_deck(deck())
        .with_deck(vec!["Forest"; 6]);
    assert_eq!(
        small.build(&engine).err(),
        Some(SetupError::DeckTooSmall {
            player: P1,
            size: 6,
            hand: 7
        })
    );
}

// =============================================================================
// London Mulligan
// =============================================================================

#[test]
fn test_london_mulligan() {
    let engine = engine();
    let started = build(&setup(GameConfig::new(2).with_seed(5)));
    let state = started.state;

    assert_eq!(state.mulligan().and_then(|m| m.deciding()), Some(P0));
    assert_eq!(state.priority(), None);
    let offered = engine.legal_actions(&state, P0);
    assert!(offered.contains(&Action::new(P0, ActionKind::KeepHand)));
    assert!(offered.contains(&Action::new(P0, ActionKind::TakeMulligan)));
    assert_eq!(engine.legal_actions(&state, P1), vec![Action::new(P1, ActionKind::Concede)]);
    assert!(matches!(
        engine.validate(&state, &Action::new(P1, ActionKind::KeepHand)),
        Err(RuleViolation::Mulligan(_))
    ));

    let result = apply(&engine, &state, Action::new(P0, ActionKind::TakeMulligan));
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::Mulligan { player, count: 1 } if *player == P0)));
    let state = result.state;
    assert_eq!(state.hand(P0).len(), 7);
    assert_eq!(state.player(P0).mulligans, 1);

    let state = apply(&engine, &state, Action::new(P0, ActionKind::KeepHand)).state;
    assert!(state.mulligan().unwrap().bottoming);
    assert!(matches!(
        engine.validate(&state, &Action::new(P0, ActionKind::KeepHand)),
        Err(RuleViolation::Mulligan(_))
    ));

    let hand = state.hand(P0);
    let two = Action::new(
        P0,
        ActionKind::BottomCards {
            cards: vec![hand[0], hand[1]],
        },
    );
    assert!(matches!(engine.validate(&state, &two), Err(RuleViolation::Mulligan(_))));
    let elsewhere = state.library(P0)[0];
    assert_eq!(
        engine.validate(&state, &Action::new(P0, ActionKind::BottomCards { cards: vec![elsewhere] })),
        Err(RuleViolation::NotInHand(elsewhere))
    );

    let bottomed = hand[3];
    let state = apply(
        &engine,
        &state,
        Action::new(P0, ActionKind::BottomCards { cards: vec![bottomed] }),
    )
    .state;
    assert_eq!(state.hand(P0).len(), 6);
    assert_eq!(state.library(P0)[0], bottomed, "bottomed cards go under the library");
    assert_eq!(state.mulligan().and_then(|m| m.deciding()), Some(P1));

    let state = apply(&engine, &state, Action::new(P1, ActionKind::KeepHand)).state;
    assert!(state.mulligan().is_none());
    assert_eq!(state.hand(P1).len(), 7);
    assert_eq!(state.turn_number(), 1);
    assert_eq!(state.step(), Step::Upkeep);
    assert_eq!(state.priority(), Some(P0));
}

/// Mulligans are decided starting with the starting player.
#[test]
fn test_mulligan_order_follows_starting_player() {
    let engine = engine();
    let state = build(&setup(GameConfig::new(3)).with_starting_player(P1)).state;

    assert_eq!(state.mulligan().and_then(|m| m.deciding()), Some(P1));
    let state = apply(&engine, &state, Action::new(P1, ActionKind::KeepHand)).state;
    assert_eq!(state.mulligan().and_then(|m| m.deciding()), Some(P2));
    let state = apply(&engine, &state, Action::new(P2, ActionKind::KeepHand)).state;
    let state = apply(&engine, &state, Action::new(P0, ActionKind::KeepHand)).state;

    assert_eq!(state.active_player(), P1);
    assert_eq!(state.priority(), Some(P1));
}

#[test]
fn test_no_other_actions_during_mulligan() {
    let engine = engine();
    let state = build(&setup(GameConfig::new(2))).state;
    let card = state.hand(P0)[0];

    assert!(engine.validate(&state, &Action::pass(P0)).is_err());
    assert!(engine.validate(&state, &Action::cast(P0, card)).is_err());
    assert!(engine.validate(&state, &Action::new(P0, ActionKind::PlayLand { card })).is_err());
}
