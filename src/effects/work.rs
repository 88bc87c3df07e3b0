//! Effect execution state as data.
//!
//! A running script is an [`EffectWork`]: the context it runs in plus the
//! queue of script nodes not yet executed. Suspending stores the queue in the
//! continuation, so resuming never re-runs a node that already finished.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::effect::{Amount, Effect};
use crate::core::{EntityId, PlayerId};

/// What an executing script knows about itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectContext {
    pub controller: PlayerId,
    /// The card or permanent the effect comes from.
    pub source: Option<EntityId>,
    /// The stack item being resolved, if any.
    pub item: Option<EntityId>,
    /// Targets by slot, already filtered to those still legal.
    pub targets: Vec<Vec<EntityId>>,
    pub x: u32,
    pub chosen_number: Option<u32>,
}

impl EffectContext {
    #[must_use]
    pub fn new(controller: PlayerId, source: Option<EntityId>) -> Self {
        Self {
            controller,
            source,
            item: None,
            targets: Vec::new(),
            x: 0,
            chosen_number: None,
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: EntityId) -> Self {
        self.item = Some(item);
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Vec<Vec<EntityId>>) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn with_x(mut self, x: u32) -> Self {
        self.x = x;
        self
    }

    /// Targets in a slot; an out-of-range slot has none.
    #[must_use]
    pub fn slot(&self, slot: usize) -> &[EntityId] {
        self.targets.get(slot).map_or(&[], Vec::as_slice)
    }

    /// The entity that deals damage for this effect.
    #[must_use]
    pub fn damage_source(&self) -> EntityId {
        self.source.unwrap_or_else(|| EntityId::player(self.controller))
    }
}

impl Amount {
    #[must_use]
    pub fn resolve(&self, ctx: &EffectContext) -> u32 {
        match self {
            Amount::Fixed(n) => *n,
            Amount::X => ctx.x,
            Amount::ChosenNumber => ctx.chosen_number.unwrap_or(0),
        }
    }
}

/// One queued script node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkItem {
    Run(Effect),
    /// Run only if the previous node did something.
    IfDid(Effect),
}

/// A script in progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectWork {
    pub ctx: EffectContext,
    /// Nodes still to run, next first.
    pub items: VecDeque<WorkItem>,
    /// Whether the most recently finished node did something.
    pub last_did: bool,
}

impl EffectWork {
    #[must_use]
    pub fn new(ctx: EffectContext, effect: Effect) -> Self {
        Self {
            ctx,
            items: VecDeque::from(vec![WorkItem::Run(effect)]),
            last_did: false,
        }
    }

    /// Queue `items` ahead of everything already queued, keeping their order.
    pub fn expand(&mut self, items: Vec<WorkItem>) {
        for item in items.into_iter().rev() {
            self.items.push_front(item);
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.items.is_empty()
    }
}

/// Scratch data a handler keeps between its own decisions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub stage: u32,
    pub entities: Vec<Vec<EntityId>>,
    pub values: Vec<i64>,
}

impl Memo {
    #[must_use]
    pub fn stage(stage: u32) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_entities(mut self, entities: Vec<EntityId>) -> Self {
        self.entities.push(entities);
        self
    }

    /// An entity list by index; missing lists are empty.
    #[must_use]
    pub fn list(&self, index: usize) -> &[EntityId] {
        self.entities.get(index).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_keeps_order_ahead_of_queue() {
        let ctx = EffectContext::new(PlayerId::new(0), None);
        let mut work = EffectWork::new(ctx, Effect::draw(3));
        work.expand(vec![WorkItem::Run(Effect::draw(1)), WorkItem::IfDid(Effect::draw(2))]);

        let order: Vec<_> = work.items.iter().cloned().collect();
        assert_eq!(
            order,
            vec![
                WorkItem::Run(Effect::draw(1)),
                WorkItem::IfDid(Effect::draw(2)),
                WorkItem::Run(Effect::draw(3)),
            ]
        );
    }

    #[test]
    fn test_amount_resolution() {
        let mut ctx = EffectContext::new(PlayerId::new(1), None).with_x(4);
        assert_eq!(Amount::X.resolve(&ctx), 4);
        assert_eq!(Amount::ChosenNumber.resolve(&ctx), 0);
        ctx.chosen_number = Some(2);
        assert_eq!(Amount::ChosenNumber.resolve(&ctx), 2);
        assert_eq!(ctx.damage_source(), EntityId(1));
    }
}
