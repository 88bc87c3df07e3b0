//! Declaring attackers and blockers.
//!
//! Attackers are declared by the active player in one action; blockers by
//! each defending player in turn order. Defenders with nothing able to block
//! are skipped automatically. Once every defender has declared, each
//! attacker blocked by two or more creatures gets a damage assignment order
//! from its controller.

use std::collections::BTreeMap;

use tracing::debug;

use crate::cards::Keyword;
use crate::core::{Component, EntityId, GameEvent, GameState, PlayerId};
use crate::decision::{Continuation, DecisionKind, DecisionResponse};
use crate::engine::{Progress, Run};
use crate::error::{contract_violation, Result, RuleViolation};
use crate::rules::EffectiveView;
use crate::turn::Step;

/// Untapped creatures `player` controls that can attack this turn.
#[must_use]
pub fn valid_attackers(state: &GameState, view: &EffectiveView, player: PlayerId) -> Vec<EntityId> {
    state
        .permanents_of(player)
        .filter(|&id| {
            let Some(components) = state.entity(id) else {
                return false;
            };
            view.is_creature(id)
                && !components.is_tapped()
                && !view.has_keyword(id, Keyword::Defender)
                && (!components.is_summoning_sick() || view.has_keyword(id, Keyword::Haste))
        })
        .collect()
}

/// Untapped creatures `player` controls.
#[must_use]
pub fn valid_blockers(state: &GameState, view: &EffectiveView, player: PlayerId) -> Vec<EntityId> {
    state
        .permanents_of(player)
        .filter(|&id| view.is_creature(id) && state.entity(id).map_or(false, |c| !c.is_tapped()))
        .collect()
}

/// Evasion check: a flyer can only be blocked by flying or reach.
#[must_use]
pub fn can_block(view: &EffectiveView, blocker: EntityId, attacker: EntityId) -> bool {
    !view.has_keyword(attacker, Keyword::Flying)
        || view.has_keyword(blocker, Keyword::Flying)
        || view.has_keyword(blocker, Keyword::Reach)
}

/// Attackers coming at `defender`.
fn attacking(state: &GameState, defender: PlayerId) -> Vec<EntityId> {
    state
        .attackers()
        .into_iter()
        .filter(|&(_, d)| d == defender)
        .map(|(a, _)| a)
        .collect()
}

/// Can `defender` block anything at all?
fn has_possible_block(state: &GameState, view: &EffectiveView, defender: PlayerId) -> bool {
    let attackers = attacking(state, defender);
    valid_blockers(state, view, defender)
        .into_iter()
        .any(|b| attackers.iter().any(|&a| can_block(view, b, a)))
}

pub(crate) fn validate_attackers(
    state: &GameState,
    view: &EffectiveView,
    player: PlayerId,
    attackers: &BTreeMap<EntityId, PlayerId>,
) -> Result<()> {
    if state.step() != Step::DeclareAttackers || state.combat().attackers_declared {
        return Err(RuleViolation::WrongTiming(
            "attackers are declared at the start of the declare attackers step".into(),
        ));
    }
    if player != state.active_player() {
        return Err(RuleViolation::WrongTiming("only the active player attacks".into()));
    }
    let able = valid_attackers(state, view, player);
    for (&attacker, &defender) in attackers {
        if !able.contains(&attacker) {
            return Err(RuleViolation::InvalidAttack(format!("{} cannot attack", attacker)));
        }
        if defender == player || defender.index() >= state.player_count() || state.has_lost(defender) {
            return Err(RuleViolation::InvalidAttack(format!("{} cannot be attacked", defender)));
        }
    }
    Ok(())
}

pub(crate) fn declare_attackers(
    run: &mut Run<'_>,
    player: PlayerId,
    attackers: &BTreeMap<EntityId, PlayerId>,
) -> Progress {
    let view = run.view();
    for (&attacker, &defender) in attackers {
        if let Some(components) = run.state_mut().entity_mut(attacker) {
            components.insert(Component::Attacking { defender });
        }
        if !view.has_keyword(attacker, Keyword::Vigilance) {
            run.tap(attacker);
        }
    }
    let combat = run.state_mut().combat_mut();
    combat.attackers_declared = true;
    combat.defenders = attackers.values().copied().collect();

    debug!(player = %player, count = attackers.len(), "attackers declared");
    run.emit(GameEvent::AttackersDeclared {
        player,
        attackers: attackers.iter().map(|(&a, &d)| (a, d)).collect(),
    });
    run.clear_passed();
    run.give_priority(Some(player));
    Progress::Done
}

pub(crate) fn validate_blockers(
    state: &GameState,
    view: &EffectiveView,
    player: PlayerId,
    blockers: &BTreeMap<EntityId, EntityId>,
) -> Result<()> {
    let order = PlayerId::apnap(state.active_player(), state.player_count());
    if state.step() != Step::DeclareBlockers || state.combat().next_to_block(order) != Some(player) {
        return Err(RuleViolation::WrongTiming(format!(
            "{} is not the player declaring blockers",
            player
        )));
    }
    let able = valid_blockers(state, view, player);
    let attackers = attacking(state, player);
    for (&blocker, &attacker) in blockers {
        if !able.contains(&blocker) {
            return Err(RuleViolation::InvalidBlock(format!("{} cannot block", blocker)));
        }
        if !attackers.contains(&attacker) {
            return Err(RuleViolation::InvalidBlock(format!(
                "{} is not attacking {}",
                attacker, player
            )));
        }
        if !can_block(view, blocker, attacker) {
            return Err(RuleViolation::InvalidBlock(format!(
                "{} cannot block {}",
                blocker, attacker
            )));
        }
    }
    Ok(())
}

pub(crate) fn declare_blockers(
    run: &mut Run<'_>,
    player: PlayerId,
    blockers: &BTreeMap<EntityId, EntityId>,
) -> Progress {
    for (&blocker, &attacker) in blockers {
        if let Some(components) = run.state_mut().entity_mut(blocker) {
            components.insert(Component::Blocking { attacker });
        }
        run.state_mut().combat_mut().blocked.insert(attacker);
    }
    run.state_mut().combat_mut().blockers_declared.insert(player);
    debug!(player = %player, count = blockers.len(), "blockers declared");
    run.emit(GameEvent::BlockersDeclared {
        player,
        blockers: blockers.iter().map(|(&b, &a)| (b, a)).collect(),
    });
    after_declaration(run)
}

/// Step entry: skip defenders who cannot block, then finish if nobody is left.
pub(crate) fn begin_blocks(run: &mut Run<'_>) -> Progress {
    let view = run.view();
    let state = run.state();
    let skipped: Vec<PlayerId> = PlayerId::apnap(state.active_player(), state.player_count())
        .filter(|p| state.combat().defenders.contains(p))
        .filter(|&p| !has_possible_block(state, &view, p))
        .collect();
    for player in skipped {
        run.state_mut().combat_mut().blockers_declared.insert(player);
        run.emit(GameEvent::BlockersDeclared {
            player,
            blockers: Vec::new(),
        });
    }
    after_declaration(run)
}

fn after_declaration(run: &mut Run<'_>) -> Progress {
    if !run.state().combat().all_blockers_declared() {
        return Progress::Done;
    }
    finish_blocks(run)
}

/// Every defender has declared: settle first strike and ask for orders.
fn finish_blocks(run: &mut Run<'_>) -> Progress {
    let view = run.view();
    let state = run.state();
    let attackers: Vec<EntityId> = state.attackers().into_iter().map(|(a, _)| a).collect();
    let blockers: Vec<EntityId> = attackers.iter().flat_map(|&a| state.blockers_of(a)).collect();
    let first_strike = attackers.iter().chain(&blockers).any(|&id| {
        view.has_keyword(id, Keyword::FirstStrike) || view.has_keyword(id, Keyword::DoubleStrike)
    });
    let needs_order: Vec<EntityId> = attackers
        .into_iter()
        .filter(|&a| state.blockers_of(a).len() >= 2)
        .collect();
    run.state_mut().combat_mut().first_strike_step = first_strike;
    ask_order(run, needs_order)
}

fn ask_order(run: &mut Run<'_>, mut needs_order: Vec<EntityId>) -> Progress {
    while !needs_order.is_empty() {
        let attacker = needs_order.remove(0);
        let blockers = run.state().blockers_of(attacker);
        if blockers.len() < 2 {
            continue;
        }
        let Some(controller) = run.state().controller_of(attacker) else {
            continue;
        };
        if run.state().has_lost(controller) {
            continue;
        }
        return run.suspend(
            controller,
            Some(attacker),
            format!("Order the blockers of {}; the first listed is assigned damage first", attacker),
            DecisionKind::OrderObjects { objects: blockers },
            Continuation::OrderBlockers {
                attacker,
                remaining: needs_order,
            },
        );
    }
    let holder = run.state().first_priority();
    run.clear_passed();
    run.give_priority(Some(holder));
    Progress::Done
}

/// Record an attacker's blocker order and ask for the next one.
pub(crate) fn resume_order(
    run: &mut Run<'_>,
    attacker: EntityId,
    remaining: Vec<EntityId>,
    response: &DecisionResponse,
) -> Progress {
    let DecisionResponse::Order(order) = response else {
        contract_violation(format!("blocker order resumed with {:?}", response));
    };
    run.state_mut()
        .combat_mut()
        .blocker_order
        .insert(attacker, order.iter().copied().collect());
    run.emit(GameEvent::BlockerOrderDeclared {
        attacker,
        order: order.clone(),
    });
    ask_order(run, remaining)
}
