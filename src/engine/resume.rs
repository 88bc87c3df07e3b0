//! Feeding decision responses back into suspended work.

use tracing::debug;

use super::run::{Progress, Run};
use super::{activation, casting};
use crate::combat::{damage, declare};
use crate::core::{GameEvent, PlayerId};
use crate::decision::{Continuation, DecisionId, DecisionResponse};
use crate::effects::resolver;
use crate::error::contract_violation;
use crate::triggers::placement;
use crate::turn::machine;

/// Consume the pending decision with `response` and continue from where the
/// engine stopped. The response has already been validated.
pub(crate) fn resume(run: &mut Run<'_>, decision: DecisionId, response: &DecisionResponse) -> Progress {
    let Some(pending) = run.state_mut().take_pending() else {
        contract_violation("resume without a pending decision");
    };
    if pending.decision.id != decision {
        contract_violation(format!(
            "response for {} but {} is pending",
            decision, pending.decision.id
        ));
    }
    let player = pending.decision.player;
    run.emit(GameEvent::DecisionSubmitted { decision, player });
    debug!(
        decision = %decision,
        player = %player,
        continuation = pending.continuation.name(),
        "resuming"
    );

    match pending.continuation {
        Continuation::CastSpell(progress) => casting::resume(run, progress, response),
        Continuation::ActivateAbility(progress) => activation::resume(run, progress, response),
        Continuation::ResumeEffect {
            effect,
            memo,
            work,
            then,
        } => resolver::resume(run, effect, memo, work, then, response),
        Continuation::PlaceTriggers(placement) => placement::resume(run, placement, response),
        Continuation::OrderBlockers { attacker, remaining } => {
            declare::resume_order(run, attacker, remaining, response)
        }
        Continuation::CombatDamage(progress) => damage::resume(run, progress, response),
        Continuation::CleanupDiscard => machine::resume_cleanup(run, response),
    }
}

/// A player left while a question was addressed to them. The first sample
/// answer is used so the work the question belongs to still completes.
pub(crate) fn answer_for_departed(run: &mut Run<'_>, player: PlayerId) -> Progress {
    let Some(pending) = run.state().pending() else {
        return Progress::Done;
    };
    if pending.decision.player != player {
        return Progress::Suspended;
    }
    let decision = pending.decision.id;
    match pending.decision.kind.sample_responses().into_iter().next() {
        Some(response) => {
            debug!(decision = %decision, player = %player, "answering for a departed player");
            resume(run, decision, &response)
        }
        None => {
            debug!(decision = %decision, player = %player, "dropping a departed player's decision");
            let _ = run.state_mut().take_pending();
            Progress::Done
        }
    }
}
