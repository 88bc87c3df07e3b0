//! Step transitions and the turn-based actions performed on entering a step.
//!
//! The engine advances the step only when nobody holds priority and nothing
//! is being waited for: all players passed with an empty stack, or the step
//! has no priority at all (untap, cleanup).

use tracing::{debug, trace};

use super::step::Step;
use crate::combat::{damage, declare, valid_attackers, CombatState};
use crate::core::{ComponentKind, EntityId, GameEvent, PlayerId};
use crate::decision::{Continuation, DecisionKind, DecisionResponse};
use crate::engine::{Progress, Run};
use crate::error::contract_violation;

/// Start turn 1 with the current active player.
pub(crate) fn begin_game(run: &mut Run<'_>) -> Progress {
    let active = run.state().active_player();
    run.state_mut().turn_mut().number = 1;
    run.emit(GameEvent::TurnChanged { turn: 1, active });
    enter_step(run, Step::Untap)
}

/// Leave the current step for the next one.
pub(crate) fn advance_step(run: &mut Run<'_>) -> Progress {
    let state = run.state();
    let step = state.step();
    let next = match step {
        Step::DeclareAttackers if state.attackers().is_empty() => Some(Step::EndCombat),
        Step::DeclareBlockers if !state.combat().first_strike_step => Some(Step::CombatDamage),
        _ => step.next(),
    };
    if step == Step::EndCombat {
        end_combat(run);
    }
    match next {
        Some(next) => enter_step(run, next),
        None => next_turn(run),
    }
}

fn next_turn(run: &mut Run<'_>) -> Progress {
    let state = run.state();
    let active = state.next_player(state.active_player());
    let turn = state.turn_number() + 1;
    let t = run.state_mut().turn_mut();
    t.number = turn;
    t.active = active;
    debug!(turn, active = %active, "turn started");
    run.emit(GameEvent::TurnChanged { turn, active });
    enter_step(run, Step::Untap)
}

fn enter_step(run: &mut Run<'_>, step: Step) -> Progress {
    let previous = run.state().step();
    let players: Vec<PlayerId> = run.state().player_ids().collect();
    for player in players {
        run.state_mut().player_mut(player).mana_pool.clear();
    }
    run.clear_passed();
    run.give_priority(None);
    run.state_mut().turn_mut().step = step;
    trace!(step = %step, "step");
    if previous.phase() != step.phase() || step == Step::Untap {
        run.emit(GameEvent::PhaseChanged { phase: step.phase() });
    }
    run.emit(GameEvent::StepChanged { step });

    let active = run.state().active_player();
    let departed = run.state().has_lost(active);
    let holder = run.state().first_priority();
    match step {
        Step::Untap => {
            untap_step(run, active);
            Progress::Done
        }
        Step::Draw => {
            let skip = run.state().turn_number() == 1 && run.state().config().skip_first_draw;
            if !skip && !departed {
                run.draw(active, 1);
            }
            run.give_priority(Some(holder));
            Progress::Done
        }
        Step::BeginCombat => {
            *run.state_mut().combat_mut() = CombatState::default();
            run.give_priority(Some(holder));
            Progress::Done
        }
        Step::DeclareAttackers => {
            let view = run.view();
            if departed || valid_attackers(run.state(), &view, active).is_empty() {
                run.state_mut().combat_mut().attackers_declared = true;
                run.emit(GameEvent::AttackersDeclared {
                    player: active,
                    attackers: Vec::new(),
                });
                run.give_priority(Some(holder));
            }
            Progress::Done
        }
        Step::DeclareBlockers => declare::begin_blocks(run),
        Step::FirstStrikeDamage => damage::begin_damage(run, true),
        Step::CombatDamage => damage::begin_damage(run, false),
        Step::Cleanup => cleanup(run, active),
        Step::Upkeep | Step::Main1 | Step::EndCombat | Step::Main2 | Step::End => {
            run.give_priority(Some(holder));
            Progress::Done
        }
    }
}

fn untap_step(run: &mut Run<'_>, active: PlayerId) {
    let permanents: Vec<EntityId> = run.state().permanents_of(active).collect();
    for id in permanents {
        run.untap(id);
        if let Some(components) = run.state_mut().entity_mut(id) {
            components.remove(ComponentKind::SummoningSick);
        }
    }
    run.state_mut().player_mut(active).lands_played = 0;
}

fn end_combat(run: &mut Run<'_>) {
    let fighters: Vec<EntityId> = run.state().battlefield().collect();
    for id in fighters {
        if let Some(components) = run.state_mut().entity_mut(id) {
            components.remove(ComponentKind::Attacking);
            components.remove(ComponentKind::Blocking);
        }
    }
    *run.state_mut().combat_mut() = CombatState::default();
}

/// Discard to hand size, then wear off damage and until-end-of-turn effects.
/// A departed active player has no hand size to discard to.
fn cleanup(run: &mut Run<'_>, active: PlayerId) -> Progress {
    let hand = run.state().hand(active);
    let limit = run.state().config().max_hand_size;
    if hand.len() > limit && !run.state().has_lost(active) {
        let excess = hand.len() - limit;
        return run.suspend(
            active,
            None,
            format!("Discard {} card(s) down to your maximum hand size", excess),
            DecisionKind::ChooseCards {
                legal: hand.into_iter().collect(),
                min: excess,
                max: excess,
            },
            Continuation::CleanupDiscard,
        );
    }
    finish_cleanup(run);
    Progress::Done
}

fn finish_cleanup(run: &mut Run<'_>) {
    let permanents: Vec<EntityId> = run.state().battlefield().collect();
    for id in permanents {
        if let Some(components) = run.state_mut().entity_mut(id) {
            components.remove(ComponentKind::Damage);
            components.remove(ComponentKind::DeathtouchDamage);
            components.remove(ComponentKind::PowerToughnessModifier);
        }
    }
    run.clear_passed();
}

pub(crate) fn resume_cleanup(run: &mut Run<'_>, response: &DecisionResponse) -> Progress {
    let DecisionResponse::Cards(cards) = response else {
        contract_violation(format!("cleanup discard resumed with {:?}", response));
    };
    let active = run.state().active_player();
    run.discard(active, cards);
    finish_cleanup(run);
    Progress::Done
}

