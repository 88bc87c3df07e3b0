//! State-based actions.
//!
//! Checked whenever a player would receive priority. All applicable actions
//! are performed together, then the check repeats until nothing changes:
//! - Tokens that left the battlefield cease to exist
//! - A player at 0 or less life, or who drew from an empty library, loses
//! - A creature with toughness 0 or less, lethal damage or deathtouch damage dies

use tracing::debug;

use super::engine::GameResult;
use crate::core::{ComponentKind, Components, EntityId, GameEvent, LossReason, PlayerId};
use crate::engine::Run;

/// One pass of the check. Returns whether anything happened.
pub(crate) fn check_state_based_actions(run: &mut Run<'_>) -> bool {
    let mut changed = false;

    let state = run.state();
    let vanished: Vec<EntityId> = state
        .entities()
        .filter(|(id, c)| c.is_token() && !state.is_on_battlefield(*id))
        .map(|(id, _)| id)
        .collect();
    for token in vanished {
        run.state_mut().forget_entity(token);
        changed = true;
    }

    let state = run.state();
    let losers: Vec<(PlayerId, LossReason)> = state
        .living_players()
        .filter_map(|p| {
            let player = state.player(p);
            if player.life <= 0 {
                Some((p, LossReason::ZeroLife))
            } else if player.drew_from_empty {
                Some((p, LossReason::DrewFromEmptyLibrary))
            } else {
                None
            }
        })
        .collect();
    for (player, reason) in losers {
        lose(run, player, reason);
        changed = true;
    }

    let view = run.view();
    let state = run.state();
    let dying: Vec<EntityId> = state
        .battlefield()
        .filter(|&id| view.is_creature(id))
        .filter(|&id| {
            let toughness = view.toughness(id);
            let components = state.entity(id);
            let damage = components.map_or(0, Components::damage);
            let deathtouched = components.map_or(false, |c| c.has(ComponentKind::DeathtouchDamage));
            toughness <= 0 || (damage > 0 && (damage as i32 >= toughness || deathtouched))
        })
        .collect();
    for creature in dying {
        debug!(creature = %creature, "dies");
        changed |= run.destroy(creature);
    }

    check_game_over(run);
    changed
}

/// Mark a player as having lost.
pub(crate) fn lose(run: &mut Run<'_>, player: PlayerId, reason: LossReason) {
    if run.state().has_lost(player) {
        return;
    }
    debug!(player = %player, reason = ?reason, "player lost");
    run.state_mut().player_mut(player).lost = Some(reason);
    run.emit(GameEvent::PlayerLost { player, reason });
    if run.state().priority() == Some(player) {
        let next = run.state().next_player(player);
        run.give_priority(Some(next));
    }
    run.state_mut().turn_mut().passed.remove(&player);
    run.state_mut().combat_mut().defenders.remove(&player);
}

/// End the game once at most one player is left.
pub(crate) fn check_game_over(run: &mut Run<'_>) -> bool {
    if run.state().outcome().is_some() {
        return true;
    }
    let living: Vec<PlayerId> = run.state().living_players().collect();
    let outcome = match living.as_slice() {
        [] => GameResult::Draw,
        [winner] => GameResult::Winner(*winner),
        _ => return false,
    };
    let winner = outcome.winner();
    debug!(winner = ?winner, "game over");
    run.state_mut().set_outcome(outcome);
    let _ = run.state_mut().take_pending();
    run.give_priority(None);
    run.emit(GameEvent::GameEnded { winner });
    true
}
