//! Open dispatch over action kinds.
//!
//! Each [`ActionTag`] maps to one [`ActionHandler`]. The processor performs
//! the checks shared by every action (game over, pending decision, players
//! who have left) before it ever reaches a handler.

use rustc_hash::FxHashMap;

use super::run::{Progress, Run};
use super::{activation, casting, resume, setup, Engine};
use crate::cards::CardDefinition;
use crate::combat::declare;
use crate::core::{Action, ActionKind, ActionTag, EntityId, GameState, LossReason, PlayerId};
use crate::error::{contract_violation, Result, RuleViolation};
use crate::rules::sba;
use crate::stack::priority;
use crate::zones::ZoneKey;

/// Validates and executes one kind of action.
///
/// `execute` is only called after `validate` accepted the same action
/// against the same snapshot.
pub trait ActionHandler: Send + Sync {
    fn validate(&self, engine: &Engine, state: &GameState, action: &Action) -> Result<()>;

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress>;
}

/// Action handlers by tag.
pub struct ActionRegistry {
    handlers: FxHashMap<ActionTag, Box<dyn ActionHandler>>,
}

impl ActionRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// A registry with a handler for every built-in action.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(ActionTag::PassPriority, Box::new(PassPriority));
        registry.register(ActionTag::CastSpell, Box::new(casting::CastSpell));
        registry.register(ActionTag::ActivateAbility, Box::new(activation::ActivateAbility));
        registry.register(ActionTag::PlayLand, Box::new(PlayLand));
        registry.register(ActionTag::DeclareAttackers, Box::new(DeclareAttackers));
        registry.register(ActionTag::DeclareBlockers, Box::new(DeclareBlockers));
        registry.register(ActionTag::OrderBlockers, Box::new(OrderBlockers));
        registry.register(ActionTag::SubmitDecision, Box::new(SubmitDecision));
        registry.register(ActionTag::TakeMulligan, Box::new(setup::Mulligan));
        registry.register(ActionTag::KeepHand, Box::new(setup::Mulligan));
        registry.register(ActionTag::BottomCards, Box::new(setup::Mulligan));
        registry.register(ActionTag::Concede, Box::new(Concede));
        registry
    }

    pub fn register(&mut self, tag: ActionTag, handler: Box<dyn ActionHandler>) {
        self.handlers.insert(tag, handler);
    }

    #[must_use]
    pub fn get(&self, tag: ActionTag) -> Option<&dyn ActionHandler> {
        self.handlers.get(&tag).map(Box::as_ref)
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

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.handlers.keys().collect();
        tags.sort();
        f.debug_struct("ActionRegistry").field("tags", &tags).finish()
    }
}

pub(crate) fn require_priority(state: &GameState, player: PlayerId) -> Result<()> {
    if state.priority() == Some(player) {
        Ok(())
    } else {
        Err(RuleViolation::NotYourPriority(player))
    }
}

/// Main phase of your own turn with an empty stack.
pub(crate) fn require_sorcery_timing(state: &GameState, player: PlayerId) -> Result<()> {
    if state.active_player() != player {
        return Err(RuleViolation::WrongTiming("only during your own turn".into()));
    }
    if !state.step().is_main() {
        return Err(RuleViolation::WrongTiming("only during a main phase".into()));
    }
    if !state.stack_is_empty() {
        return Err(RuleViolation::WrongTiming("only while the stack is empty".into()));
    }
    Ok(())
}

/// Definition of a card in `player`'s hand.
pub(crate) fn card_in_hand<'e>(
    engine: &'e Engine,
    state: &GameState,
    player: PlayerId,
    card: EntityId,
) -> Result<&'e CardDefinition> {
    if state.zone_of(card) != Some(ZoneKey::hand(player)) {
        return Err(RuleViolation::NotInHand(card));
    }
    let name = state.card_name(card).ok_or(RuleViolation::UnknownEntity(card))?;
    engine
        .catalog()
        .definition_for(name)
        .ok_or_else(|| RuleViolation::UnknownCard(name.to_string()))
}

struct PassPriority;

impl ActionHandler for PassPriority {
    fn validate(&self, _engine: &Engine, state: &GameState, action: &Action) -> Result<()> {
        require_priority(state, action.player)
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        Ok(priority::pass_priority(run, action.player))
    }
}

struct PlayLand;

impl ActionHandler for PlayLand {
    fn validate(&self, engine: &Engine, state: &GameState, action: &Action) -> Result<()> {
        let ActionKind::PlayLand { card } = action.kind else {
            contract_violation("play land handler given another action");
        };
        let def = card_in_hand(engine, state, action.player, card)?;
        if !def.is_land() {
            return Err(RuleViolation::NotALand(card));
        }
        require_priority(state, action.player)?;
        require_sorcery_timing(state, action.player)?;
        if state.player(action.player).lands_played >= state.config().lands_per_turn {
            return Err(RuleViolation::LandLimit);
        }
        Ok(())
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        let ActionKind::PlayLand { card } = action.kind else {
            contract_violation("play land handler given another action");
        };
        run.put_onto_battlefield(card, action.player);
        run.state_mut().player_mut(action.player).lands_played += 1;
        Ok(Progress::Done)
    }
}

struct DeclareAttackers;

impl ActionHandler for DeclareAttackers {
    fn validate(&self, engine: &Engine, state: &GameState, action: &Action) -> Result<()> {
        let ActionKind::DeclareAttackers { attackers } = &action.kind else {
            contract_violation("declare attackers handler given another action");
        };
        declare::validate_attackers(state, &engine.project(state), action.player, attackers)
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        let ActionKind::DeclareAttackers { attackers } = &action.kind else {
            contract_violation("declare attackers handler given another action");
        };
        Ok(declare::declare_attackers(run, action.player, attackers))
    }
}

struct DeclareBlockers;

impl ActionHandler for DeclareBlockers {
    fn validate(&self, engine: &Engine, state: &GameState, action: &Action) -> Result<()> {
        let ActionKind::DeclareBlockers { blockers } = &action.kind else {
            contract_violation("declare blockers handler given another action");
        };
        declare::validate_blockers(state, &engine.project(state), action.player, blockers)
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        let ActionKind::DeclareBlockers { blockers } = &action.kind else {
            contract_violation("declare blockers handler given another action");
        };
        Ok(declare::declare_blockers(run, action.player, blockers))
    }
}

/// Reached only when no blocker order is being asked for; an order that
/// answers the pending question is turned into a decision response first.
struct OrderBlockers;

impl ActionHandler for OrderBlockers {
    fn validate(&self, _engine: &Engine, _state: &GameState, action: &Action) -> Result<()> {
        let ActionKind::OrderBlockers { attacker, .. } = &action.kind else {
            contract_violation("order blockers handler given another action");
        };
        Err(RuleViolation::InvalidBlockerOrder(format!(
            "no blocker order is being asked for {}",
            attacker
        )))
    }

    fn execute(&self, _run: &mut Run<'_>, _action: &Action) -> Result<Progress> {
        contract_violation("order blockers executed without a pending order")
    }
}

struct SubmitDecision;

impl ActionHandler for SubmitDecision {
    fn validate(&self, _engine: &Engine, _state: &GameState, _action: &Action) -> Result<()> {
        Err(RuleViolation::NoPendingDecision)
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        let ActionKind::SubmitDecision { decision, response } = &action.kind else {
            contract_violation("submit decision handler given another action");
        };
        Ok(resume::resume(run, *decision, response))
    }
}

struct Concede;

impl ActionHandler for Concede {
    fn validate(&self, _engine: &Engine, _state: &GameState, _action: &Action) -> Result<()> {
        Ok(())
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        let player = action.player;
        sba::lose(run, player, LossReason::Conceded);
        if sba::check_game_over(run) {
            return Ok(Progress::Done);
        }
        let progress = setup::drop_from_mulligan(run, player);
        if progress == Progress::Suspended {
            return Ok(progress);
        }
        Ok(resume::answer_for_departed(run, player))
    }
}
