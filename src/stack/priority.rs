//! The priority protocol.
//!
//! Passing hands priority to the next player still in the game and records
//! the pass. Once every living player has passed in succession the top of
//! the stack resolves and the active player (or the next seat still in the
//! game) receives priority; with an empty stack nobody holds priority and the
//! turn machine moves on.
//!
//! Any other action clears the recorded passes.

use tracing::trace;

use super::resolve::resolve_top;
use crate::core::PlayerId;
use crate::engine::{Progress, Run};

pub(crate) fn pass_priority(run: &mut Run<'_>, player: PlayerId) -> Progress {
    run.state_mut().turn_mut().passed.insert(player);
    trace!(player = %player, "passed priority");

    if !run.state().all_players_passed() {
        let next = run.state().next_player(player);
        run.give_priority(Some(next));
        return Progress::Done;
    }

    run.clear_passed();
    run.give_priority(None);
    if run.state().stack_is_empty() {
        trace!("all passed with an empty stack");
        return Progress::Done;
    }
    resolve_top(run)
}
