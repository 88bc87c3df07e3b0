//! Paying mana costs.
//!
//! The strategy on the action picks where mana comes from; the engine's
//! [`ManaSolver`](crate::cards::ManaSolver) is only consulted for
//! `PaymentStrategy::Auto`. Paying taps the sources, adds their mana to the
//! pool and spends the cost from the pool.

use tracing::trace;

use super::run::Run;
use super::Engine;
use crate::cards::mana::MAX_X;
use crate::cards::{mana_sources, Mana, ManaCost, PaymentStrategy};
use crate::core::{EntityId, GameEvent, GameState, PlayerId};

/// Sources that would be tapped, with the mana each makes.
fn sources_for(
    engine: &Engine,
    state: &GameState,
    player: PlayerId,
    cost: &ManaCost,
    x: u32,
    strategy: &PaymentStrategy,
) -> Option<Vec<(EntityId, Mana)>> {
    let available = mana_sources(state, engine.catalog(), player);
    let lookup = |id: EntityId| available.iter().find(|&&(s, _)| s == id).copied();
    let chosen: Vec<(EntityId, Mana)> = match strategy {
        PaymentStrategy::Auto => engine
            .solver()
            .solve(state, engine.catalog(), player, cost, x)?
            .sources
            .into_iter()
            .map(lookup)
            .collect::<Option<_>>()?,
        PaymentStrategy::FromPool => Vec::new(),
        PaymentStrategy::Sources(ids) => {
            for (i, id) in ids.iter().enumerate() {
                if ids[..i].contains(id) {
                    return None;
                }
            }
            ids.iter().map(|&id| lookup(id)).collect::<Option<_>>()?
        }
    };

    let mut pool = state.player(player).mana_pool;
    for &(_, mana) in &chosen {
        pool.add(mana, 1);
    }
    pool.pay(cost, x).map(|_| chosen)
}

#[must_use]
pub(crate) fn can_pay(
    engine: &Engine,
    state: &GameState,
    player: PlayerId,
    cost: &ManaCost,
    x: u32,
    strategy: &PaymentStrategy,
) -> bool {
    sources_for(engine, state, player, cost, x, strategy).is_some()
}

/// Largest X payable with this strategy.
#[must_use]
pub(crate) fn max_x(
    engine: &Engine,
    state: &GameState,
    player: PlayerId,
    cost: &ManaCost,
    strategy: &PaymentStrategy,
) -> u32 {
    if !cost.has_x() {
        return 0;
    }
    if *strategy == PaymentStrategy::Auto {
        return engine.solver().max_x(state, engine.catalog(), player, cost);
    }
    let mut x = 0;
    while x < MAX_X && can_pay(engine, state, player, cost, x + 1, strategy) {
        x += 1;
    }
    x
}

/// Pay `cost`. Returns false, having changed nothing, if it cannot be paid.
pub(crate) fn pay(run: &mut Run<'_>, player: PlayerId, cost: &ManaCost, x: u32, strategy: &PaymentStrategy) -> bool {
    let Some(sources) = sources_for(run.engine(), run.state(), player, cost, x, strategy) else {
        return false;
    };
    for (source, mana) in sources {
        run.tap(source);
        run.add_mana(player, mana, 1);
    }
    let pool = run.state().player(player).mana_pool;
    let Some(left) = pool.pay(cost, x) else {
        return false;
    };
    run.state_mut().player_mut(player).mana_pool = left;
    let amount = cost.total(x);
    if amount > 0 {
        trace!(player = %player, amount, "mana spent");
        run.emit(GameEvent::ManaSpent { player, amount });
    }
    true
}
