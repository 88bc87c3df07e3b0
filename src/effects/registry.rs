//! Open dispatch over effect kinds.
//!
//! Every [`EffectKind`] maps to one boxed [`EffectHandler`]. New kinds (most
//! often `Effect::Custom` tags) are added by registering a handler; the
//! executor only ever looks handlers up by kind.

use rustc_hash::FxHashMap;

use super::effect::{Effect, EffectKind};
use super::handlers;
use super::work::{EffectContext, Memo, WorkItem};
use crate::core::PlayerId;
use crate::decision::{DecisionKind, DecisionResponse};
use crate::engine::Run;
use crate::error::contract_violation;

/// A handler asking for input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suspension {
    pub player: PlayerId,
    pub prompt: String,
    pub kind: DecisionKind,
    /// Handed back to `resume` with the response.
    pub memo: Memo,
}

/// Outcome of one handler call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectStep {
    /// Finished; `did` is whether anything happened (for "if you do").
    Done { did: bool },
    /// Replace this node with these, run next.
    Expand(Vec<WorkItem>),
    Suspend(Suspension),
}

impl EffectStep {
    #[must_use]
    pub fn done(did: bool) -> Self {
        EffectStep::Done { did }
    }

    #[must_use]
    pub fn ask(player: PlayerId, prompt: impl Into<String>, kind: DecisionKind, memo: Memo) -> Self {
        EffectStep::Suspend(Suspension {
            player,
            prompt: prompt.into(),
            kind,
            memo,
        })
    }
}

/// Executes one kind of effect.
///
/// `resume` is called with the same `effect` and the memo from the
/// suspension after the player's response has been validated against the
/// decision the handler asked for.
pub trait EffectHandler: Send + Sync {
    fn execute(&self, run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep;

    fn resume(
        &self,
        _run: &mut Run<'_>,
        _ctx: &mut EffectContext,
        effect: &Effect,
        _memo: &Memo,
        _response: &DecisionResponse,
    ) -> EffectStep {
        contract_violation(format!("{:?} handler never suspends", effect.kind()))
    }
}

/// Effect handlers by kind.
pub struct EffectRegistry {
    handlers: FxHashMap<EffectKind, Box<dyn EffectHandler>>,
}

impl EffectRegistry {
    /// A registry with no handlers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// A registry with a handler for every built-in effect.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        handlers::register_builtins(&mut registry);
        registry
    }

    /// Register (or replace) the handler for a kind.
    pub fn register(&mut self, kind: EffectKind, handler: Box<dyn EffectHandler>) {
        self.handlers.insert(kind, handler);
    }

    #[must_use]
    pub fn get(&self, kind: &EffectKind) -> Option<&dyn EffectHandler> {
        self.handlers.get(kind).map(Box::as_ref)
    }

    #[must_use]
    pub fn contains(&self, kind: &EffectKind) -> bool {
        self.handlers.contains_key(kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("EffectRegistry").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl EffectHandler for Noop {
        fn execute(&self, _run: &mut Run<'_>, _ctx: &mut EffectContext, _effect: &Effect) -> EffectStep {
            EffectStep::done(false)
        }
    }

    #[test]
    fn test_builtins_cover_every_builtin_kind() {
        let registry = EffectRegistry::with_builtins();
        for kind in [
            EffectKind::DealDamage,
            EffectKind::Sacrifice,
            EffectKind::Composite,
            EffectKind::IfYouDo,
            EffectKind::May,
            EffectKind::RevealAndSplit,
            EffectKind::Shuffle,
        ] {
            assert!(registry.contains(&kind), "{:?}", kind);
        }
        assert!(!registry.contains(&EffectKind::Custom("proliferate".into())));
    }

    #[test]
    fn test_register_custom() {
        let mut registry = EffectRegistry::empty();
        registry.register(EffectKind::Custom("noop".into()), Box::new(Noop));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&EffectKind::Custom("noop".into())).is_some());
    }
}
