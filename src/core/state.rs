//! The game state snapshot.
//!
//! ## GameState
//!
//! Immutable aggregate of:
//! - Entities and their components
//! - Zone membership and ordering (including the stack)
//! - Turn pointers: turn number, active player, step, priority, passed set
//! - Combat bookkeeping
//! - At most one pending decision, paired with its continuation
//! - RNG position, action history and the game outcome
//!
//! Everything is stored in `im` persistent collections; cloning a snapshot is
//! O(1). The public `with_*` methods return a new snapshot and never touch the
//! receiver. The engine works on an owned clone through the crate-internal
//! `&mut` methods, which copy only the paths they write.
//!
//! ```
//! use ccg_rules::core::{GameConfig, GameState, PlayerId};
//!
//! let state = GameState::new(GameConfig::default());
//! let next = state.with_priority(PlayerId::new(1));
//!
//! assert_eq!(state.priority(), None);
//! assert_eq!(next.priority(), Some(PlayerId::new(1)));
//! ```

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};

use super::action::ActionRecord;
use super::component::{Component, Components};
use super::config::GameConfig;
use super::entity::EntityId;
use super::event::LossReason;
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRngState;
use crate::cards::ManaPool;
use crate::combat::CombatState;
use crate::decision::{Continuation, DecisionId, Pending, PendingDecision};
use crate::error::SnapshotError;
use crate::rules::GameResult;
use crate::triggers::PendingTrigger;
use crate::turn::Step;
use crate::zones::{ZoneKey, ZoneKind, ZonePosition, Zones};

/// Per-player data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub life: i64,
    /// Lands played this turn.
    pub lands_played: u32,
    /// Set by a failed draw; turned into a loss by the state-based check.
    pub drew_from_empty: bool,
    pub lost: Option<LossReason>,
    pub mana_pool: ManaPool,
    /// Mulligans taken during setup.
    pub mulligans: u32,
}

impl PlayerState {
    #[must_use]
    pub fn new(life: i64) -> Self {
        Self {
            life,
            lands_played: 0,
            drew_from_empty: false,
            lost: None,
            mana_pool: ManaPool::default(),
            mulligans: 0,
        }
    }

    #[must_use]
    pub fn has_lost(&self) -> bool {
        self.lost.is_some()
    }
}

/// Turn and priority pointers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn number, starting at 1.
    pub number: u32,
    pub active: PlayerId,
    pub step: Step,
    /// `None` while no one may act (automatic steps, awaited declarations).
    pub priority: Option<PlayerId>,
    /// Players who passed since the last state-changing event.
    pub passed: OrdSet<PlayerId>,
}

/// London mulligan progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulliganState {
    /// Players still to decide, the deciding player first.
    pub order: Vector<PlayerId>,
    /// The deciding player has kept and must now bottom cards.
    pub bottoming: bool,
}

impl MulliganState {
    #[must_use]
    pub fn deciding(&self) -> Option<PlayerId> {
        self.order.front().copied()
    }
}

/// Complete, immutable game snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    config: GameConfig,
    players: PlayerMap<PlayerState>,
    entities: OrdMap<EntityId, Components>,
    zones: Zones,
    turn: TurnState,
    combat: CombatState,
    pending: Option<Pending>,
    pending_triggers: Vector<PendingTrigger>,
    mulligan: Option<MulliganState>,
    next_entity: u32,
    next_decision: u32,
    rng: GameRngState,
    history: Vector<ActionRecord>,
    outcome: Option<GameResult>,
}

impl GameState {
    /// Empty game for a configuration: no cards, turn 1, untap step,
    /// player 0 active and nobody holding priority.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let player_count = config.player_count;
        let players = PlayerMap::new(player_count, |_| PlayerState::new(config.starting_life));
        let rng = GameRngState::new(config.seed);

        Self {
            players,
            entities: OrdMap::new(),
            zones: Zones::default(),
            turn: TurnState {
                number: 1,
                active: PlayerId::new(0),
                step: Step::Untap,
                priority: None,
                passed: OrdSet::new(),
            },
            combat: CombatState::default(),
            pending: None,
            pending_triggers: Vector::new(),
            mulligan: None,
            next_entity: EntityId::first_non_player(player_count),
            next_decision: 1,
            rng,
            history: Vector::new(),
            outcome: None,
            config,
        }
    }

    // === Reads ===

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.config.player_count
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count())
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        self.players.get(player)
    }

    #[must_use]
    pub fn life(&self, player: PlayerId) -> i64 {
        self.players.get(player).life
    }

    #[must_use]
    pub fn has_lost(&self, player: PlayerId) -> bool {
        self.players.get(player).has_lost()
    }

    /// Players still in the game, in seat order.
    pub fn living_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|(_, p)| !p.has_lost()).map(|(id, _)| id)
    }

    /// The components of an entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Components> {
        self.entities.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Components)> {
        self.entities.iter().map(|(id, c)| (*id, c))
    }

    #[must_use]
    pub fn zones(&self) -> &Zones {
        &self.zones
    }

    /// Contents of a zone, bottom to top.
    #[must_use]
    pub fn zone(&self, key: ZoneKey) -> Vector<EntityId> {
        self.zones.contents(key)
    }

    #[must_use]
    pub fn zone_of(&self, id: EntityId) -> Option<ZoneKey> {
        self.zones.zone_of(id)
    }

    #[must_use]
    pub fn is_on_battlefield(&self, id: EntityId) -> bool {
        self.zones.is_in(id, ZoneKey::battlefield())
    }

    pub fn battlefield(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.zones.iter(ZoneKey::battlefield())
    }

    /// Permanents a player controls.
    pub fn permanents_of(&self, player: PlayerId) -> impl Iterator<Item = EntityId> + '_ {
        self.battlefield()
            .filter(move |&e| self.controller_of(e) == Some(player))
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> Vector<EntityId> {
        self.zone(ZoneKey::hand(player))
    }

    #[must_use]
    pub fn library(&self, player: PlayerId) -> Vector<EntityId> {
        self.zone(ZoneKey::library(player))
    }

    #[must_use]
    pub fn graveyard(&self, player: PlayerId) -> Vector<EntityId> {
        self.zone(ZoneKey::graveyard(player))
    }

    /// The stack, bottom to top.
    #[must_use]
    pub fn stack(&self) -> Vector<EntityId> {
        self.zone(ZoneKey::stack())
    }

    #[must_use]
    pub fn stack_top(&self) -> Option<EntityId> {
        self.zones.top(ZoneKey::stack())
    }

    #[must_use]
    pub fn stack_is_empty(&self) -> bool {
        self.zones.size(ZoneKey::stack()) == 0
    }

    #[must_use]
    pub fn controller_of(&self, id: EntityId) -> Option<PlayerId> {
        if let Some(player) = id.as_player(self.player_count()) {
            return Some(player);
        }
        self.entity(id)?.controller()
    }

    #[must_use]
    pub fn owner_of(&self, id: EntityId) -> Option<PlayerId> {
        if let Some(player) = id.as_player(self.player_count()) {
            return Some(player);
        }
        self.entity(id)?.owner()
    }

    #[must_use]
    pub fn card_name(&self, id: EntityId) -> Option<&str> {
        self.entity(id)?.card_name()
    }

    /// Creatures blocking `attacker`, in assignment order when one was declared.
    #[must_use]
    pub fn blockers_of(&self, attacker: EntityId) -> Vec<EntityId> {
        let blocking: Vec<EntityId> = self
            .battlefield()
            .filter(|&e| self.entity(e).and_then(Components::blocking) == Some(attacker))
            .collect();
        match self.combat.blocker_order.get(&attacker) {
            Some(order) => order.iter().copied().filter(|b| blocking.contains(b)).collect(),
            None => blocking,
        }
    }

    /// Attacking creatures with the player each one attacks.
    #[must_use]
    pub fn attackers(&self) -> Vec<(EntityId, PlayerId)> {
        self.battlefield()
            .filter_map(|e| self.entity(e)?.attacking().map(|d| (e, d)))
            .collect()
    }

    #[must_use]
    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn.number
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn.active
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.turn.step
    }

    #[must_use]
    pub fn priority(&self) -> Option<PlayerId> {
        self.turn.priority
    }

    #[must_use]
    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.turn.passed.contains(&player)
    }

    /// Has every player still in the game passed in succession?
    #[must_use]
    pub fn all_players_passed(&self) -> bool {
        self.living_players().all(|p| self.turn.passed.contains(&p))
    }

    /// The next player in turn order after `current` who is still in the game.
    #[must_use]
    pub fn next_player(&self, current: PlayerId) -> PlayerId {
        let count = self.player_count();
        let mut candidate = current.next_seat(count);
        for _ in 0..count {
            if !self.has_lost(candidate) {
                return candidate;
            }
            candidate = candidate.next_seat(count);
        }
        current
    }

    /// Who the turn hands priority to: the active player, or the next seat
    /// still in the game once the active player has left. A departed player's
    /// turn runs to its end without them.
    #[must_use]
    pub fn first_priority(&self) -> PlayerId {
        let active = self.active_player();
        if self.has_lost(active) {
            self.next_player(active)
        } else {
            active
        }
    }

    #[must_use]
    pub fn combat(&self) -> &CombatState {
        &self.combat
    }

    #[must_use]
    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.pending.as_ref().map(|p| &p.decision)
    }

    #[must_use]
    pub fn pending_triggers(&self) -> &Vector<PendingTrigger> {
        &self.pending_triggers
    }

    #[must_use]
    pub fn mulligan(&self) -> Option<&MulliganState> {
        self.mulligan.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&GameResult> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn rng_state(&self) -> GameRngState {
        self.rng
    }

    // === Persistent updates ===

    /// Snapshot with an entity's components replaced (or the entity added).
    #[must_use]
    pub fn with_entity(&self, id: EntityId, components: Components) -> Self {
        let mut next = self.clone();
        next.entities.insert(id, components);
        next
    }

    /// Snapshot with `f` applied to an entity's components. Unknown ids are a no-op.
    #[must_use]
    pub fn update_entity(&self, id: EntityId, f: impl FnOnce(Components) -> Components) -> Self {
        let mut next = self.clone();
        if let Some(components) = next.entities.remove(&id) {
            next.entities.insert(id, f(components));
        }
        next
    }

    /// Snapshot with an entity added to a zone. The entity must not be in a zone.
    #[must_use]
    pub fn add_to_zone(&self, id: EntityId, key: ZoneKey, position: ZonePosition) -> Self {
        let mut next = self.clone();
        next.zones.insert(id, key, position);
        next
    }

    /// Snapshot with an entity removed from whatever zone it is in.
    #[must_use]
    pub fn remove_from_zone(&self, id: EntityId) -> Self {
        let mut next = self.clone();
        next.zones.remove(id);
        next
    }

    /// Snapshot with priority given to `player`.
    #[must_use]
    pub fn with_priority(&self, player: PlayerId) -> Self {
        let mut next = self.clone();
        next.turn.priority = Some(player);
        next
    }

    /// Snapshot with `player` recorded as having passed.
    #[must_use]
    pub fn with_priority_passed(&self, player: PlayerId) -> Self {
        let mut next = self.clone();
        next.turn.passed.insert(player);
        next
    }

    /// Snapshot paused on a decision.
    #[must_use]
    pub fn with_pending_decision(&self, decision: PendingDecision, continuation: Continuation) -> Self {
        let mut next = self.clone();
        next.pending = Some(Pending {
            decision,
            continuation,
        });
        next
    }

    /// Snapshot with the pending decision and its continuation dropped.
    #[must_use]
    pub fn with_decision_cleared(&self) -> Self {
        let mut next = self.clone();
        next.pending = None;
        next
    }

    /// Snapshot with a new card instance owned by `owner` placed on top of
    /// `zone`. Returns the new snapshot and the card's id.
    #[must_use]
    pub fn with_card(&self, owner: PlayerId, name: &str, zone: ZoneKind) -> (Self, EntityId) {
        let mut next = self.clone();
        let id = next.create_card(owner, name, ZoneKey::new(owner, zone));
        (next, id)
    }

    /// Snapshot positioned at `step` of turn `number` with `active` as the
    /// active player. Priority goes to the active player on priority steps.
    #[must_use]
    pub fn with_turn(&self, number: u32, active: PlayerId, step: Step) -> Self {
        let mut next = self.clone();
        next.turn = TurnState {
            number,
            active,
            step,
            priority: step.has_priority().then_some(active),
            passed: OrdSet::new(),
        };
        next
    }

    #[must_use]
    pub fn with_life(&self, player: PlayerId, life: i64) -> Self {
        let mut next = self.clone();
        next.players.get_mut(player).life = life;
        next
    }

    // === Persistence ===

    /// Encode the snapshot, including any pending decision, with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let state: GameState = bincode::deserialize(bytes)?;
        if state.players.player_count() != state.config.player_count {
            return Err(SnapshotError::Inconsistent(format!(
                "{} player entries for a {}-player config",
                state.players.player_count(),
                state.config.player_count
            )));
        }
        Ok(state)
    }

    // === Engine-internal mutation on owned working copies ===

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Components> {
        self.entities.get_mut(&id)
    }

    pub(crate) fn insert_entity(&mut self, id: EntityId, components: Components) {
        self.entities.insert(id, components);
    }

    /// Drop an entity from tracking entirely.
    pub(crate) fn forget_entity(&mut self, id: EntityId) {
        self.zones.remove(id);
        self.entities.remove(&id);
    }

    pub(crate) fn zones_mut(&mut self) -> &mut Zones {
        &mut self.zones
    }

    pub(crate) fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        self.players.get_mut(player)
    }

    pub(crate) fn turn_mut(&mut self) -> &mut TurnState {
        &mut self.turn
    }

    pub(crate) fn combat_mut(&mut self) -> &mut CombatState {
        &mut self.combat
    }

    pub(crate) fn set_pending(&mut self, pending: Pending) {
        self.pending = Some(pending);
    }

    pub(crate) fn take_pending(&mut self) -> Option<Pending> {
        self.pending.take()
    }

    pub(crate) fn pending_triggers_mut(&mut self) -> &mut Vector<PendingTrigger> {
        &mut self.pending_triggers
    }

    pub(crate) fn set_mulligan(&mut self, mulligan: Option<MulliganState>) {
        self.mulligan = mulligan;
    }

    pub(crate) fn set_outcome(&mut self, outcome: GameResult) {
        self.outcome = Some(outcome);
    }

    pub(crate) fn push_history(&mut self, player: PlayerId, action: super::action::ActionKind) {
        let sequence = self.history.len() as u32;
        self.history.push_back(ActionRecord {
            player,
            action,
            turn: self.turn.number,
            sequence,
        });
    }

    pub(crate) fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    pub(crate) fn alloc_decision(&mut self) -> DecisionId {
        let id = DecisionId(self.next_decision);
        self.next_decision += 1;
        id
    }

    /// Create a card instance on top of a zone.
    pub(crate) fn create_card(&mut self, owner: PlayerId, name: &str, zone: ZoneKey) -> EntityId {
        let id = self.alloc_entity();
        let mut components = Components::new()
            .with(Component::Card { name: name.to_string() })
            .with(Component::Owner(owner));
        if zone.kind == ZoneKind::Battlefield {
            components.insert(Component::Controller(owner));
        }
        self.entities.insert(id, components);
        self.zones.insert(id, zone, ZonePosition::Top);
        id
    }

    /// Shuffle a zone with the next RNG stream.
    pub(crate) fn shuffle_zone(&mut self, key: ZoneKey) {
        let mut cards: Vec<EntityId> = self.zones.iter(key).collect();
        self.rng = self.rng.shuffle(&mut cards);
        self.zones.reorder(key, cards.into_iter().collect());
    }
}
