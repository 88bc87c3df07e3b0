//! Enumerating legal actions.
//!
//! Candidates are generated per action kind and filtered through
//! [`Engine::validate`], so the list never disagrees with what `process`
//! accepts. Declarations and decisions with many possible answers are
//! sampled rather than fully enumerated.

use std::collections::BTreeMap;

use super::Engine;
use crate::combat::{can_block, valid_attackers, valid_blockers};
use crate::core::{Action, ActionKind, EntityId, GameState, PlayerId};
use crate::turn::Step;

pub(crate) fn legal_actions(engine: &Engine, state: &GameState, player: PlayerId) -> Vec<Action> {
    if state.outcome().is_some() || player.index() >= state.player_count() || state.has_lost(player) {
        return Vec::new();
    }
    let mut candidates = Vec::new();

    if let Some(pending) = state.pending() {
        let decision = &pending.decision;
        if decision.player == player {
            candidates.extend(
                decision
                    .kind
                    .sample_responses()
                    .into_iter()
                    .map(|response| Action::submit(player, decision.id, response)),
            );
        }
    } else if let Some(mulligan) = state.mulligan() {
        if mulligan.deciding() == Some(player) {
            if mulligan.bottoming {
                let count = state.player(player).mulligans as usize;
                let cards = state.hand(player).into_iter().take(count).collect();
                candidates.push(Action::new(player, ActionKind::BottomCards { cards }));
            } else {
                candidates.push(Action::new(player, ActionKind::KeepHand));
                candidates.push(Action::new(player, ActionKind::TakeMulligan));
            }
        }
    } else {
        declarations(engine, state, player, &mut candidates);
        if state.priority() == Some(player) {
            priority_actions(engine, state, player, &mut candidates);
        }
    }

    candidates.push(Action::new(player, ActionKind::Concede));
    candidates
        .into_iter()
        .filter(|action| engine.validate(state, action).is_ok())
        .collect()
}

fn declarations(engine: &Engine, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    let view = engine.project(state);
    match state.step() {
        Step::DeclareAttackers if !state.combat().attackers_declared => {
            let attackers = valid_attackers(state, &view, player);
            let defenders: Vec<PlayerId> = state.living_players().filter(|&p| p != player).collect();
            out.push(attack(player, BTreeMap::new()));
            if let Some(&first) = defenders.first() {
                out.push(attack(player, attackers.iter().map(|&a| (a, first)).collect()));
            }
            for &attacker in &attackers {
                for &defender in &defenders {
                    out.push(attack(player, BTreeMap::from([(attacker, defender)])));
                }
            }
        }
        Step::DeclareBlockers => {
            out.push(block(player, BTreeMap::new()));
            let blockers = valid_blockers(state, &view, player);
            for (attacker, defender) in state.attackers() {
                if defender != player {
                    continue;
                }
                for &blocker in &blockers {
                    if can_block(&view, blocker, attacker) {
                        out.push(block(player, BTreeMap::from([(blocker, attacker)])));
                    }
                }
            }
        }
        _ => {}
    }
}

fn attack(player: PlayerId, attackers: BTreeMap<EntityId, PlayerId>) -> Action {
    Action::new(player, ActionKind::DeclareAttackers { attackers })
}

fn block(player: PlayerId, blockers: BTreeMap<EntityId, EntityId>) -> Action {
    Action::new(player, ActionKind::DeclareBlockers { blockers })
}

fn priority_actions(engine: &Engine, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    out.push(Action::pass(player));
    for card in state.hand(player) {
        let Some(def) = state.card_name(card).and_then(|name| engine.catalog().definition_for(name)) else {
            continue;
        };
        if def.is_land() {
            out.push(Action::new(player, ActionKind::PlayLand { card }));
        } else {
            out.push(Action::cast(player, card));
        }
    }
    for permanent in state.permanents_of(player) {
        let Some(def) = state
            .card_name(permanent)
            .and_then(|name| engine.catalog().definition_for(name))
        else {
            continue;
        };
        for index in 0..def.activated.len() {
            out.push(Action::activate(player, permanent, index));
        }
    }
}
