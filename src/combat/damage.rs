//! Combat damage steps.
//!
//! Assignment happens attacker by attacker. An unblocked attacker hits the
//! player it attacks; one blocked by a single creature hits that creature;
//! anything more (several blockers, or trample) is the attacking player's
//! choice under the lethal-damage-in-order rule. Blockers always hit the
//! attacker they block. Creatures of a player who has left the game deal no
//! combat damage. No damage is dealt until every assignment is made, then all
//! of it is dealt at once.

use tracing::debug;

use crate::cards::Keyword;
use crate::core::{EntityId, GameEvent};
use crate::decision::{Continuation, DamageProgress, DamageSlot, DecisionKind, DecisionResponse};
use crate::engine::{Progress, Run};
use crate::error::contract_violation;
use crate::rules::EffectiveView;

/// Does `id` deal damage in this damage step?
fn strikes_now(view: &EffectiveView, id: EntityId, first_strike: bool, split: bool) -> bool {
    let first = view.has_keyword(id, Keyword::FirstStrike);
    let double = view.has_keyword(id, Keyword::DoubleStrike);
    if first_strike {
        first || double
    } else if split {
        !first || double
    } else {
        true
    }
}

fn power_of(view: &EffectiveView, id: EntityId) -> u32 {
    view.power(id).max(0) as u32
}

/// Damage that is lethal to `blocker`, counting what it already has.
fn lethal_to(run: &Run<'_>, view: &EffectiveView, blocker: EntityId, deathtouch: bool) -> u32 {
    if deathtouch {
        return 1;
    }
    let marked = run.state().entity(blocker).map_or(0, |c| c.damage()) as i32;
    (view.toughness(blocker) - marked).max(1) as u32
}

/// Enter a combat damage step.
pub(crate) fn begin_damage(run: &mut Run<'_>, first_strike: bool) -> Progress {
    let view = run.view();
    let split = run.state().combat().first_strike_step;
    let remaining = run
        .state()
        .attackers()
        .into_iter()
        .map(|(a, _)| a)
        .filter(|&a| strikes_now(&view, a, first_strike, split) && power_of(&view, a) > 0)
        .collect();
    assign(
        run,
        DamageProgress {
            first_strike,
            remaining,
            assigned: Vec::new(),
        },
    )
}

/// Assign damage for each remaining attacker, asking when the choice is not forced.
fn assign(run: &mut Run<'_>, mut progress: DamageProgress) -> Progress {
    let view = run.view();
    while let Some(&attacker) = progress.remaining.first() {
        let state = run.state();
        let Some(defender) = state
            .entity(attacker)
            .and_then(|c| c.attacking())
            .filter(|&d| !state.has_lost(d))
        else {
            progress.remaining.remove(0);
            continue;
        };
        let Some(controller) = state.controller_of(attacker).filter(|&c| !state.has_lost(c)) else {
            progress.remaining.remove(0);
            continue;
        };
        let amount = power_of(&view, attacker);
        let player = EntityId::player(defender);
        let blockers = state.blockers_of(attacker);
        let trample = view.has_keyword(attacker, Keyword::Trample);

        if !state.combat().is_blocked(attacker) {
            progress.assigned.push((attacker, player, amount));
        } else if blockers.is_empty() {
            if trample {
                progress.assigned.push((attacker, player, amount));
            }
        } else if blockers.len() == 1 && !trample {
            progress.assigned.push((attacker, blockers[0], amount));
        } else {
            let deathtouch = view.has_keyword(attacker, Keyword::Deathtouch);
            let slots = blockers
                .iter()
                .map(|&blocker| DamageSlot {
                    blocker,
                    lethal: lethal_to(run, &view, blocker, deathtouch),
                })
                .collect();
            return run.suspend(
                controller,
                Some(attacker),
                format!("Assign {} combat damage from {}", amount, attacker),
                DecisionKind::AssignCombatDamage {
                    attacker,
                    amount,
                    blockers: slots,
                    trample_to: trample.then_some(player),
                },
                Continuation::CombatDamage(progress),
            );
        }
        progress.remaining.remove(0);
    }

    deal(run, progress);
    Progress::Done
}

/// Apply the assignment for the attacker at the head of `progress`.
pub(crate) fn resume(run: &mut Run<'_>, mut progress: DamageProgress, response: &DecisionResponse) -> Progress {
    let DecisionResponse::DamageAssignment(assignment) = response else {
        contract_violation(format!("combat damage resumed with {:?}", response));
    };
    if progress.remaining.is_empty() {
        contract_violation("combat damage resumed with no attacker waiting");
    }
    let attacker = progress.remaining.remove(0);
    progress.assigned.extend(
        assignment
            .iter()
            .filter(|&&(_, amount)| amount > 0)
            .map(|&(recipient, amount)| (attacker, recipient, amount)),
    );
    assign(run, progress)
}

/// Blockers' damage, then everything dealt simultaneously.
fn deal(run: &mut Run<'_>, mut progress: DamageProgress) {
    let view = run.view();
    let split = run.state().combat().first_strike_step;
    let state = run.state();
    for blocker in state.battlefield() {
        let Some(attacker) = state.entity(blocker).and_then(|c| c.blocking()) else {
            continue;
        };
        if state.controller_of(blocker).map_or(true, |c| state.has_lost(c)) {
            continue;
        }
        let amount = power_of(&view, blocker);
        if amount > 0 && state.is_on_battlefield(attacker) && strikes_now(&view, blocker, progress.first_strike, split) {
            progress.assigned.push((blocker, attacker, amount));
        }
    }

    let mut sources: Vec<EntityId> = progress.assigned.iter().map(|&(s, _, _)| s).collect();
    sources.dedup();
    for source in sources {
        let assignments = progress
            .assigned
            .iter()
            .filter(|&&(s, _, _)| s == source)
            .map(|&(_, recipient, amount)| (recipient, amount))
            .collect();
        run.emit(GameEvent::DamageAssigned { source, assignments });
    }
    debug!(
        first_strike = progress.first_strike,
        assignments = progress.assigned.len(),
        "combat damage"
    );
    for (source, recipient, amount) in progress.assigned {
        run.deal_damage(source, recipient, amount, true);
    }

    let holder = run.state().first_priority();
    run.clear_passed();
    run.give_priority(Some(holder));
}
