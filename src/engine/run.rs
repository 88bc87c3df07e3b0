//! The working copy of one transition.
//!
//! Processing an action clones the snapshot into a [`Run`], applies every
//! change to that owned copy and collects the events it emits. The caller's
//! snapshot is never touched; an action that fails validation never gets a
//! `Run` at all.
//!
//! The primitives here are the only code that moves cards, marks damage or
//! changes life totals, so every such change emits its event exactly once.

use im::OrdSet;
use tracing::{debug, trace, warn};

use super::Engine;
use crate::cards::{CardDefinition, Keyword, Mana};
use crate::core::{
    Component, ComponentKind, Components, CounterKind, EntityId, GameEvent, GameState, PlayerId,
};
use crate::core::component::BATTLEFIELD_ONLY;
use crate::decision::{Continuation, DecisionKind, Pending, PendingDecision};
use crate::rules::EffectiveView;
use crate::stack::StackItem;
use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

/// Whether a computation finished or paused on a decision.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Done,
    Suspended,
}

/// An owned snapshot being transformed, plus the events emitted so far.
pub struct Run<'e> {
    engine: &'e Engine,
    state: GameState,
    events: Vec<GameEvent>,
    /// Events before this index have been checked for triggers.
    scanned: usize,
}

impl<'e> Run<'e> {
    pub(crate) fn new(engine: &'e Engine, state: GameState) -> Self {
        Self {
            engine,
            state,
            events: Vec::new(),
            scanned: 0,
        }
    }

    pub(crate) fn finish(self) -> (GameState, Vec<GameEvent>) {
        (self.state, self.events)
    }

    #[must_use]
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events not yet checked for triggers; marks them checked.
    pub(crate) fn take_unscanned(&mut self) -> Vec<GameEvent> {
        let fresh = self.events[self.scanned..].to_vec();
        self.scanned = self.events.len();
        fresh
    }

    /// Effective characteristics of the current battlefield.
    #[must_use]
    pub fn view(&self) -> EffectiveView {
        self.engine.project(&self.state)
    }

    /// Catalog definition of the card an entity is an instance of.
    #[must_use]
    pub fn definition_of(&self, id: EntityId) -> Option<&'e CardDefinition> {
        let name = self.state.card_name(id)?;
        self.engine.catalog().definition_for(name)
    }

    #[must_use]
    pub fn is_creature(&self, id: EntityId) -> bool {
        self.definition_of(id).map_or(false, CardDefinition::is_creature)
    }

    fn update(&mut self, id: EntityId, f: impl FnOnce(&mut Components)) -> bool {
        match self.state.entity_mut(id) {
            Some(components) => {
                f(components);
                true
            }
            None => false,
        }
    }

    // === Priority ===

    pub(crate) fn give_priority(&mut self, player: Option<PlayerId>) {
        if self.state.priority() == player {
            return;
        }
        self.state.turn_mut().priority = player;
        trace!(player = ?player, "priority");
        self.emit(GameEvent::PriorityChanged { player });
    }

    pub(crate) fn clear_passed(&mut self) {
        self.state.turn_mut().passed = OrdSet::new();
    }

    /// Store a decision and the continuation that consumes its answer.
    pub(crate) fn suspend(
        &mut self,
        player: PlayerId,
        source: Option<EntityId>,
        prompt: String,
        kind: DecisionKind,
        continuation: Continuation,
    ) -> Progress {
        let id = self.state.alloc_decision();
        debug!(
            decision = %id,
            player = %player,
            kind = kind.name(),
            continuation = continuation.name(),
            "suspended"
        );
        self.state.set_pending(Pending {
            decision: PendingDecision {
                id,
                player,
                source,
                prompt,
                kind,
            },
            continuation,
        });
        self.emit(GameEvent::DecisionRequested { decision: id, player });
        Progress::Suspended
    }

    // === Zones ===

    /// Move an entity between zones. Leaving the battlefield drops every
    /// battlefield-only component and the controller override; leaving the
    /// stack drops the stack item.
    pub fn move_entity(&mut self, id: EntityId, to: ZoneKey, position: ZonePosition) -> bool {
        let Some(from) = self.state.zone_of(id) else {
            return false;
        };
        let Some(controller) = self.state.controller_of(id) else {
            return false;
        };
        self.update(id, |c| {
            if from.kind == ZoneKind::Battlefield && to.kind != ZoneKind::Battlefield {
                for kind in BATTLEFIELD_ONLY {
                    c.remove(kind);
                }
                c.remove(ComponentKind::Controller);
            }
            if from.kind == ZoneKind::Stack && to.kind != ZoneKind::Stack {
                c.remove(ComponentKind::StackItem);
            }
        });
        self.state.zones_mut().move_to(id, to, position);
        trace!(entity = %id, from = %from, to = %to, "zone change");
        self.emit(GameEvent::ZoneChange {
            entity: id,
            from,
            to,
            controller,
        });
        true
    }

    /// Put a card onto the battlefield under `controller`.
    pub fn put_onto_battlefield(&mut self, id: EntityId, controller: PlayerId) -> bool {
        self.update(id, |c| c.insert(Component::Controller(controller)));
        if !self.move_entity(id, ZoneKey::battlefield(), ZonePosition::Top) {
            return false;
        }
        if self.is_creature(id) {
            self.update(id, |c| c.insert(Component::SummoningSick));
        }
        true
    }

    fn leave_battlefield(&mut self, id: EntityId, kind: ZoneKind) -> bool {
        if !self.state.is_on_battlefield(id) {
            return false;
        }
        let Some(owner) = self.state.owner_of(id) else {
            return false;
        };
        self.move_entity(id, ZoneKey::new(owner, kind), ZonePosition::Top)
    }

    pub fn destroy(&mut self, id: EntityId) -> bool {
        self.leave_battlefield(id, ZoneKind::Graveyard)
    }

    pub fn sacrifice(&mut self, id: EntityId) -> bool {
        self.leave_battlefield(id, ZoneKind::Graveyard)
    }

    pub fn exile(&mut self, id: EntityId) -> bool {
        self.leave_battlefield(id, ZoneKind::Exile)
    }

    pub fn return_to_hand(&mut self, id: EntityId) -> bool {
        self.leave_battlefield(id, ZoneKind::Hand)
    }

    /// Draw `count` cards. Drawing from an empty library records the failure
    /// for the state-based check and stops.
    pub fn draw(&mut self, player: PlayerId, count: u32) -> Vec<EntityId> {
        let library = ZoneKey::library(player);
        let hand = ZoneKey::hand(player);
        let mut drawn = Vec::new();
        for _ in 0..count {
            let Some(card) = self.state.zones().top(library) else {
                self.state.player_mut(player).drew_from_empty = true;
                self.emit(GameEvent::DrawFailed { player });
                break;
            };
            self.state.zones_mut().move_to(card, hand, ZonePosition::Top);
            drawn.push(card);
        }
        if !drawn.is_empty() {
            self.emit(GameEvent::CardsDrawn {
                player,
                cards: drawn.clone(),
            });
        }
        drawn
    }

    pub fn discard(&mut self, player: PlayerId, cards: &[EntityId]) {
        let hand = ZoneKey::hand(player);
        let graveyard = ZoneKey::graveyard(player);
        let discarded: Vec<EntityId> = cards
            .iter()
            .copied()
            .filter(|&card| self.state.zones().is_in(card, hand))
            .collect();
        for &card in &discarded {
            self.state.zones_mut().move_to(card, graveyard, ZonePosition::Top);
        }
        if !discarded.is_empty() {
            self.emit(GameEvent::CardsDiscarded {
                player,
                cards: discarded,
            });
        }
    }

    pub fn shuffle_library(&mut self, player: PlayerId) {
        self.state.shuffle_zone(ZoneKey::library(player));
        self.emit(GameEvent::LibraryShuffled { player });
    }

    // === Permanents ===

    pub fn tap(&mut self, id: EntityId) -> bool {
        let untapped = self.state.entity(id).map_or(false, |c| !c.is_tapped());
        if untapped && self.update(id, |c| c.insert(Component::Tapped)) {
            self.emit(GameEvent::Tapped { entity: id });
            return true;
        }
        false
    }

    pub fn untap(&mut self, id: EntityId) -> bool {
        let tapped = self.state.entity(id).map_or(false, Components::is_tapped);
        if tapped && self.update(id, |c| {
            c.remove(ComponentKind::Tapped);
        }) {
            self.emit(GameEvent::Untapped { entity: id });
            return true;
        }
        false
    }

    pub fn add_counters(&mut self, id: EntityId, kind: CounterKind, amount: u32) -> bool {
        if amount == 0 || !self.state.is_on_battlefield(id) {
            return false;
        }
        self.update(id, |c| c.adjust_counters(kind, i64::from(amount)));
        self.emit(GameEvent::CountersAdded {
            entity: id,
            kind,
            amount,
        });
        true
    }

    pub fn remove_counters(&mut self, id: EntityId, kind: CounterKind, amount: u32) -> bool {
        let present = self.state.entity(id).map_or(0, |c| c.counters(kind));
        let removed = present.min(amount);
        if removed == 0 {
            return false;
        }
        self.update(id, |c| c.adjust_counters(kind, -i64::from(removed)));
        self.emit(GameEvent::CountersRemoved {
            entity: id,
            kind,
            amount: removed,
        });
        true
    }

    /// Until-end-of-turn power/toughness change.
    pub fn modify_power_toughness(&mut self, id: EntityId, power: i32, toughness: i32) -> bool {
        if !self.state.is_on_battlefield(id) {
            return false;
        }
        self.update(id, |c| {
            let (p, t) = c.pt_modifier();
            c.insert(Component::PowerToughnessModifier {
                power: p + power,
                toughness: t + toughness,
            });
        })
    }

    /// Create a token of a catalog card on the battlefield.
    pub fn create_token(&mut self, controller: PlayerId, name: &str) -> Option<EntityId> {
        let Some(def) = self.engine.catalog().definition_for(name) else {
            warn!(card = name, "token card is not in the catalog");
            return None;
        };
        let id = self.state.alloc_entity();
        let mut components = Components::new()
            .with(Component::Card {
                name: name.to_string(),
            })
            .with(Component::Owner(controller))
            .with(Component::Controller(controller))
            .with(Component::Token);
        if def.is_creature() {
            components.insert(Component::SummoningSick);
        }
        self.state.insert_entity(id, components);
        self.state
            .zones_mut()
            .insert(id, ZoneKey::battlefield(), ZonePosition::Top);
        self.emit(GameEvent::TokenCreated { token: id, controller });
        Some(id)
    }

    // === Damage, life, mana ===

    /// Deal damage, returning the amount dealt. Players lose that much life;
    /// creatures have it marked.
    pub fn deal_damage(&mut self, source: EntityId, target: EntityId, amount: u32, combat: bool) -> u32 {
        if amount == 0 {
            return 0;
        }
        if let Some(player) = target.as_player(self.state.player_count()) {
            if self.state.has_lost(player) {
                return 0;
            }
            self.change_life(player, -i64::from(amount));
        } else if self.state.is_on_battlefield(target) && self.is_creature(target) {
            let deathtouch = self
                .definition_of(source)
                .map_or(false, |def| def.has_keyword(Keyword::Deathtouch));
            self.update(target, |c| {
                let marked = c.damage();
                c.insert(Component::Damage(marked + amount));
                if deathtouch {
                    c.insert(Component::DeathtouchDamage);
                }
            });
        } else {
            return 0;
        }
        self.emit(GameEvent::DamageDealt {
            source,
            target,
            amount,
            combat,
        });
        amount
    }

    pub fn change_life(&mut self, player: PlayerId, delta: i64) {
        if delta == 0 {
            return;
        }
        let old = self.state.life(player);
        let new = old + delta;
        self.state.player_mut(player).life = new;
        self.emit(GameEvent::LifeChanged { player, old, new });
    }

    pub fn add_mana(&mut self, player: PlayerId, mana: Mana, amount: u32) {
        if amount == 0 {
            return;
        }
        self.state.player_mut(player).mana_pool.add(mana, amount);
        self.emit(GameEvent::ManaAdded {
            player,
            mana,
            amount,
        });
    }

    // === Stack ===

    /// Put a new ability entity on top of the stack.
    pub(crate) fn create_ability(&mut self, card: &str, item: StackItem) -> EntityId {
        let id = self.state.alloc_entity();
        let controller = item.controller;
        let components = Components::new()
            .with(Component::Card {
                name: card.to_string(),
            })
            .with(Component::Owner(controller))
            .with(Component::Controller(controller))
            .with(Component::StackItem(item));
        self.state.insert_entity(id, components);
        self.state
            .zones_mut()
            .insert(id, ZoneKey::stack(), ZonePosition::Top);
        trace!(ability = %id, "pushed");
        id
    }

    pub(crate) fn update_stack_item(&mut self, id: EntityId, f: impl FnOnce(&mut StackItem)) {
        self.update(id, |c| {
            if let Some(mut item) = c.stack_item().cloned() {
                f(&mut item);
                c.insert(Component::StackItem(item));
            }
        });
    }

    /// Counter a spell or ability on the stack.
    pub fn counter(&mut self, id: EntityId) -> bool {
        if self.state.zone_of(id) != Some(ZoneKey::stack()) {
            return false;
        }
        let Some(item) = self.state.entity(id).and_then(Components::stack_item).cloned() else {
            return false;
        };
        debug!(item = %id, "countered");
        if item.is_spell() {
            self.emit(GameEvent::SpellCountered { spell: id });
            if let Some(owner) = self.state.owner_of(id) {
                self.move_entity(id, ZoneKey::graveyard(owner), ZonePosition::Top);
            }
        } else {
            self.emit(GameEvent::AbilityCountered { ability: id });
            self.state.forget_entity(id);
        }
        true
    }
}
