//! Property tests over random games.
//!
//! Games are driven by picking among the legal actions with proptest-chosen
//! indices, so each case is a different but reproducible game.

mod common;

use proptest::prelude::*;

use ccg_rules::core::{Action, ActionKind, GameConfig, GameEvent, GameState, PlayerId};
use ccg_rules::engine::{Engine, GameSetup};

use common::*;

fn deck() -> Vec<&'static str> {
    let mut cards = vec!["Forest"; 5];
    cards.extend(["Mountain"; 5]);
    cards.extend(["Plains"; 2]);
    cards.extend([
        "Grizzly Bears",
        "Grizzly Bears",
        "Llanowar Elves",
        "Soul Warden",
        "Blisterstick Shaman",
        "Prodigal Pyromancer",
        "Colossal Dreadmaw",
        "White Knight",
        "Lightning Bolt",
        "Shock",
        "Giant Growth",
        "Raise the Alarm",
        "Fireball",
        "Goblin Bombardment",
    ]);
    cards
}

fn opening(engine: &Engine, players: usize, seed: u64) -> GameState {
    let mut setup = GameSetup::new(GameConfig::new(players).with_seed(seed));
    for _ in 0..players {
        setup = setup.with_deck(deck());
    }
    match setup.build(engine) {
        Ok(transition) => transition.state,
        Err(err) => panic!("setup failed: {}", err),
    }
}

/// Every legal action except conceding, across all players.
fn candidates(engine: &Engine, state: &GameState) -> Vec<Action> {
    state
        .player_ids()
        .flat_map(|p| engine.legal_actions(state, p))
        .filter(|a| !matches!(a.kind, ActionKind::Concede))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Legal actions are accepted, the game never stalls, and every
    /// snapshot survives a bincode round trip.
    #[test]
    fn test_random_play_stays_consistent(
        seed in any::<u64>(),
        players in 2usize..=4,
        choices in prop::collection::vec(any::<usize>(), 120),
    ) {
        let engine = engine();
        let mut state = opening(&engine, players, seed);

        for choice in choices {
            if state.outcome().is_some() {
                break;
            }
            let options = candidates(&engine, &state);
            prop_assert!(!options.is_empty(), "no legal action at {:?}", state.step());

            let action = options[choice % options.len()].clone();
            prop_assert_eq!(engine.validate(&state, &action), Ok(()));
            let next = engine.process(&state, &action);
            prop_assert!(next.is_ok(), "{:?} listed as legal but rejected: {:?}", action, next);
            state = next.unwrap().state;

            let bytes = state.to_bytes().unwrap();
            prop_assert_eq!(&GameState::from_bytes(&bytes).unwrap(), &state);
        }
    }

    /// Validation is a pure function of the snapshot and the action.
    #[test]
    fn test_validation_is_idempotent(
        seed in any::<u64>(),
        choices in prop::collection::vec(any::<usize>(), 40),
        probe in any::<usize>(),
    ) {
        let engine = engine();
        let mut state = opening(&engine, 2, seed);
        for choice in choices {
            let options = candidates(&engine, &state);
            if options.is_empty() {
                break;
            }
            state = engine.process(&state, &options[choice % options.len()]).unwrap().state;
        }

        let before = state.clone();
        let hand: Vec<_> = state.player_ids().flat_map(|p| state.hand(p)).collect();
        let mut actions = vec![Action::pass(PlayerId::new(0)), Action::pass(PlayerId::new(1))];
        if !hand.is_empty() {
            let card = hand[probe % hand.len()];
            actions.push(Action::cast(PlayerId::new(0), card));
            actions.push(Action::new(PlayerId::new(1), ActionKind::PlayLand { card }));
        }
        for action in &actions {
            let first = engine.validate(&state, action);
            let second = engine.validate(&state, action);
            prop_assert_eq!(&first, &second);
            if let Err(reason) = &first {
                let processed = engine.process(&state, action).err();
                prop_assert_eq!(processed.as_ref(), Some(reason));
            }
        }
        prop_assert_eq!(state, before);
    }

    /// Passing hands priority to the next living player until everyone has
    /// passed in succession.
    #[test]
    fn test_priority_alternates(players in 2usize..=6, passes in 1usize..6) {
        let engine = engine();
        let mut table = Table::new(players);
        table.battlefield(P0, "Mountain");
        let bolt = table.hand(P0, "Lightning Bolt");
        let state = table.state();
        let mut state = apply(&engine, &state, Action::cast_targeting(P0, bolt, vec![vec![player(P1)]])).state;

        for _ in 0..passes.min(players - 1) {
            let holder = state.priority().unwrap();
            state = apply(&engine, &state, Action::pass(holder)).state;
            prop_assert_eq!(state.priority(), Some(state.next_player(holder)));
            prop_assert_eq!(state.stack_top(), Some(bolt));
        }
    }

    /// Spells resolve in the reverse of the order they were cast.
    #[test]
    fn test_stack_resolves_last_in_first_out(count in 1usize..5) {
        let engine = engine();
        let mut table = Table::new(2);
        let mut spells = Vec::new();
        for _ in 0..count {
            table.battlefield(P0, "Mountain");
            spells.push(table.hand(P0, "Shock"));
        }
        let mut state = table.state();
        for &spell in &spells {
            state = apply(&engine, &state, Action::cast_targeting(P0, spell, vec![vec![player(P1)]])).state;
        }

        let mut resolved = Vec::new();
        while !state.stack_is_empty() {
            let holder = state.priority().unwrap();
            let result = apply(&engine, &state, Action::pass(holder));
            resolved.extend(result.events.iter().filter_map(|e| match e {
                GameEvent::SpellResolved { spell } => Some(*spell),
                _ => None,
            }));
            state = result.state;
        }
        spells.reverse();
        prop_assert_eq!(resolved, spells);
        prop_assert_eq!(state.life(P1), 20 - 2 * count as i64);
    }
}
