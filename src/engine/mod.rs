//! The action processor.
//!
//! [`Engine::process`] is the single entry point: it validates one action
//! against a snapshot and, if legal, produces the next snapshot plus the
//! events emitted on the way. The input snapshot is never modified.
//!
//! ## Flow
//!
//! 1. Validate: game not over; with a decision pending only a matching
//!    response (or a concession) is accepted; otherwise the action's handler
//!    checks its own rules
//! 2. Execute the handler on an owned working copy ([`Run`])
//! 3. Settle: detect triggers, apply state-based actions, put triggers on the
//!    stack, and advance steps until a player has to act
//!
//! ## Example
//!
//! ```
//! use ccg_rules::cards::{CardDefinition, CardRegistry, Mana, Color};
//! use ccg_rules::core::{Action, GameConfig, MulliganRule};
//! use ccg_rules::engine::{Engine, GameSetup};
//! use ccg_rules::turn::Step;
//!
//! let catalog = CardRegistry::new().with(CardDefinition::land("Forest", Mana::Colored(Color::Green)));
//! let engine = Engine::new(catalog);
//! let deck = vec!["Forest"; 20];
//! let opening = GameSetup::new(GameConfig::new(2).with_mulligan(MulliganRule::None))
//!     .with_deck(deck.clone())
//!     .with_deck(deck)
//!     .build(&engine)
//!     .unwrap();
//!
//! let state = opening.state;
//! assert_eq!(state.step(), Step::Upkeep);
//! let active = state.active_player();
//! let next = engine.process(&state, &Action::pass(active)).unwrap();
//! assert_eq!(next.state.priority(), Some(state.next_player(active)));
//! ```

mod actions;
mod activation;
mod casting;
mod legal;
mod payment;
mod resume;
mod run;
mod setup;

use std::sync::Arc;

use tracing::debug;

use crate::cards::{BasicManaSolver, CardCatalog, ManaSolver};
use crate::core::{Action, ActionKind, ActionTag, GameEvent, GameState, PlayerId};
use crate::decision::{Continuation, DecisionResponse};
use crate::effects::{EffectHandler, EffectKind, EffectRegistry};
use crate::error::{Result, RuleViolation};
use crate::rules::{sba, BaseProjector, EffectiveView, GameResult, Projector, RulesEngine};
use crate::triggers::{detect, placement};
use crate::turn::{machine, Step};

pub use actions::{ActionHandler, ActionRegistry};
pub use run::{Progress, Run};
pub use setup::GameSetup;

/// The state after an accepted action and what happened on the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

pub type ActionResult = std::result::Result<Transition, RuleViolation>;

/// Rules engine: collaborators plus the handler registries.
///
/// An `Engine` holds no game state; one engine can process any number of
/// games, and a snapshot produced by one engine can be continued by another
/// built from the same catalog.
pub struct Engine {
    catalog: Arc<dyn CardCatalog>,
    solver: Arc<dyn ManaSolver>,
    projector: Arc<dyn Projector>,
    effects: EffectRegistry,
    actions: ActionRegistry,
}

impl Engine {
    /// Engine with the bundled solver, projector and handlers.
    pub fn new(catalog: impl CardCatalog + 'static) -> Self {
        Self::with_shared_catalog(Arc::new(catalog))
    }

    pub fn with_shared_catalog(catalog: Arc<dyn CardCatalog>) -> Self {
        Self {
            catalog,
            solver: Arc::new(BasicManaSolver),
            projector: Arc::new(BaseProjector),
            effects: EffectRegistry::with_builtins(),
            actions: ActionRegistry::with_builtins(),
        }
    }

    #[must_use]
    pub fn with_solver(mut self, solver: impl ManaSolver + 'static) -> Self {
        self.solver = Arc::new(solver);
        self
    }

    #[must_use]
    pub fn with_projector(mut self, projector: impl Projector + 'static) -> Self {
        self.projector = Arc::new(projector);
        self
    }

    /// Register (or replace) the handler for an effect kind.
    pub fn register_effect(&mut self, kind: EffectKind, handler: Box<dyn EffectHandler>) {
        self.effects.register(kind, handler);
    }

    /// Register (or replace) the handler for an action kind.
    pub fn register_action(&mut self, tag: ActionTag, handler: Box<dyn ActionHandler>) {
        self.actions.register(tag, handler);
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CardCatalog {
        self.catalog.as_ref()
    }

    #[must_use]
    pub fn solver(&self) -> &dyn ManaSolver {
        self.solver.as_ref()
    }

    #[must_use]
    pub fn projector(&self) -> &dyn Projector {
        self.projector.as_ref()
    }

    #[must_use]
    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    #[must_use]
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Effective characteristics of a snapshot's battlefield.
    #[must_use]
    pub fn project(&self, state: &GameState) -> EffectiveView {
        self.projector.project(state, self.catalog())
    }

    /// Check an action without applying it. Never modifies anything.
    pub fn validate(&self, state: &GameState, action: &Action) -> Result<()> {
        let action = normalize(state, action);
        self.validate_normalized(state, &action)
    }

    fn validate_normalized(&self, state: &GameState, action: &Action) -> Result<()> {
        if state.outcome().is_some() {
            return Err(RuleViolation::GameOver);
        }
        let player = action.player;
        if player.index() >= state.player_count() {
            return Err(RuleViolation::WrongTiming(format!("{} is not in this game", player)));
        }
        if state.has_lost(player) {
            return Err(RuleViolation::PlayerOut { player });
        }
        if matches!(action.kind, ActionKind::Concede) {
            return Ok(());
        }

        match (state.pending(), &action.kind) {
            (Some(pending), ActionKind::SubmitDecision { decision, response }) => {
                let asked = &pending.decision;
                if *decision != asked.id {
                    return Err(RuleViolation::DecisionMismatch {
                        expected: asked.id,
                        got: *decision,
                    });
                }
                if player != asked.player {
                    return Err(RuleViolation::WrongDecisionPlayer {
                        decision: asked.id,
                        player,
                        owner: asked.player,
                    });
                }
                response.validate(&asked.kind)
            }
            (Some(pending), _) => Err(RuleViolation::DecisionPending(pending.decision.id)),
            (None, ActionKind::SubmitDecision { .. }) => Err(RuleViolation::NoPendingDecision),
            (None, _) => {
                let tag = action.tag();
                let handler = self.actions.get(tag).ok_or(RuleViolation::NoHandler(tag))?;
                handler.validate(self, state, action)
            }
        }
    }

    /// Apply an action.
    pub fn process(&self, state: &GameState, action: &Action) -> ActionResult {
        let action = normalize(state, action);
        if let Err(reason) = self.validate_normalized(state, &action) {
            debug!(player = %action.player, action = %action.tag(), reason = %reason, "rejected");
            return Err(reason);
        }
        let tag = action.tag();
        let handler = self.actions.get(tag).ok_or(RuleViolation::NoHandler(tag))?;
        debug!(
            player = %action.player,
            action = %tag,
            decision = ?state.pending_decision().map(|d| d.id),
            "processing"
        );

        let mut run = Run::new(self, state.clone());
        run.state_mut().push_history(action.player, action.kind.clone());
        if tag != ActionTag::PassPriority {
            run.clear_passed();
        }
        match handler.execute(&mut run, &action)? {
            Progress::Done => settle(&mut run),
            // Paused on a decision: only record what triggered on the way.
            Progress::Suspended => detect::detect(&mut run),
        }

        let (state, events) = run.finish();
        Ok(Transition { state, events })
    }

    /// Actions `player` can take right now.
    #[must_use]
    pub fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action> {
        legal::legal_actions(self, state, player)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("effects", &self.effects)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

impl RulesEngine for Engine {
    fn validate(&self, state: &GameState, action: &Action) -> Result<()> {
        Engine::validate(self, state, action)
    }

    fn process(&self, state: &GameState, action: &Action) -> ActionResult {
        Engine::process(self, state, action)
    }

    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action> {
        Engine::legal_actions(self, state, player)
    }

    fn is_terminal(&self, state: &GameState) -> Option<GameResult> {
        state.outcome().cloned()
    }
}

/// `OrderBlockers` answering the pending blocker-order decision is that
/// decision's response.
fn normalize(state: &GameState, action: &Action) -> Action {
    if let ActionKind::OrderBlockers { attacker, order } = &action.kind {
        if let Some(pending) = state.pending() {
            if let Continuation::OrderBlockers { attacker: asked, .. } = &pending.continuation {
                if asked == attacker {
                    return Action::submit(
                        action.player,
                        pending.decision.id,
                        DecisionResponse::Order(order.clone()),
                    );
                }
            }
        }
    }
    action.clone()
}

/// Is the game waiting on a declaration rather than on priority?
fn awaiting_declaration(state: &GameState) -> bool {
    if state.mulligan().is_some() {
        return true;
    }
    let active = state.active_player();
    match state.step() {
        Step::DeclareAttackers => !state.combat().attackers_declared && !state.has_lost(active),
        Step::DeclareBlockers => state
            .combat()
            .next_to_block(PlayerId::apnap(active, state.player_count()))
            .is_some(),
        _ => false,
    }
}

/// Run the game forward until a player has to act.
pub(crate) fn settle(run: &mut Run<'_>) {
    loop {
        if run.state().outcome().is_some() {
            break;
        }
        detect::detect(run);
        if run.state().pending().is_some() {
            break;
        }
        if sba::check_state_based_actions(run) {
            continue;
        }
        if run.state().outcome().is_some() {
            break;
        }
        if run.state().priority().is_some() {
            if run.state().pending_triggers().is_empty() {
                break;
            }
            match placement::place(run) {
                Progress::Done => continue,
                Progress::Suspended => break,
            }
        }
        if awaiting_declaration(run.state()) {
            break;
        }
        if machine::advance_step(run) == Progress::Suspended {
            break;
        }
    }
}
