//! The effect driver.
//!
//! Pops script nodes off an [`EffectWork`] queue and runs each through its
//! registered handler. A handler asking for input ends the loop: the node,
//! the handler's memo and the remaining queue become a
//! `Continuation::ResumeEffect` and the game pauses. Resuming re-enters the
//! same handler with the response and then keeps draining the queue.

use tracing::{trace, warn};

use super::effect::Effect;
use super::registry::{EffectStep, Suspension};
use super::work::{EffectWork, WorkItem};
use crate::decision::{Completion, Continuation, DecisionResponse};
use crate::engine::{Progress, Run};
use crate::error::contract_violation;
use crate::stack;

/// Run `work` to completion or to its first suspension. On completion the
/// `then` step is performed.
pub(crate) fn execute(run: &mut Run<'_>, mut work: EffectWork, then: Completion) -> Progress {
    loop {
        let Some(item) = work.items.pop_front() else {
            stack::complete(run, then);
            return Progress::Done;
        };
        let effect = match item {
            WorkItem::Run(effect) => effect,
            WorkItem::IfDid(effect) if work.last_did => effect,
            WorkItem::IfDid(effect) => {
                trace!(kind = ?effect.kind(), "skipped; previous effect did nothing");
                work.last_did = false;
                continue;
            }
        };

        let kind = effect.kind();
        let Some(handler) = run.engine().effects().get(&kind) else {
            warn!(kind = ?kind, "no effect handler registered");
            work.last_did = false;
            continue;
        };
        trace!(kind = ?kind, "executing effect");
        let step = handler.execute(run, &mut work.ctx, &effect);
        if let Some(suspension) = absorb(&mut work, step) {
            return suspend(run, effect, suspension, work, then);
        }
    }
}

/// Feed a validated response back into the handler that suspended.
pub(crate) fn resume(
    run: &mut Run<'_>,
    effect: Effect,
    memo: super::work::Memo,
    mut work: EffectWork,
    then: Completion,
    response: &DecisionResponse,
) -> Progress {
    let kind = effect.kind();
    let handler = run
        .engine()
        .effects()
        .get(&kind)
        .unwrap_or_else(|| contract_violation(format!("suspended {:?} has no handler", kind)));
    let step = handler.resume(run, &mut work.ctx, &effect, &memo, response);
    if let Some(suspension) = absorb(&mut work, step) {
        return suspend(run, effect, suspension, work, then);
    }
    execute(run, work, then)
}

fn absorb(work: &mut EffectWork, step: EffectStep) -> Option<Suspension> {
    match step {
        EffectStep::Done { did } => {
            work.last_did = did;
            None
        }
        EffectStep::Expand(items) => {
            work.expand(items);
            None
        }
        EffectStep::Suspend(suspension) => Some(suspension),
    }
}

fn suspend(
    run: &mut Run<'_>,
    effect: Effect,
    suspension: Suspension,
    work: EffectWork,
    then: Completion,
) -> Progress {
    let source = work.ctx.source;
    run.suspend(
        suspension.player,
        source,
        suspension.prompt,
        suspension.kind,
        Continuation::ResumeEffect {
            effect,
            memo: suspension.memo,
            work,
            then,
        },
    )
}
