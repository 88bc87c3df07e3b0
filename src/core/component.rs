//! Components: typed facts attached to entities.
//!
//! An entity's full description is the set of components attached to it.
//! `Components` stores at most one component per [`ComponentKind`] in an
//! `im::OrdMap`, so snapshots share unchanged entities structurally and
//! iteration order is stable.
//!
//! ## Relationships
//!
//! Relations between entities are stored in one direction only:
//! a blocker points at the attacker it blocks, an aura points at what it is
//! attached to. The inverse is answered by scanning the state
//! (see `GameState::blockers_of`).

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;
use crate::stack::StackItem;

/// Kinds of counter that can be placed on a permanent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    PlusOne,
    MinusOne,
    Charge,
}

/// Discriminant of [`Component`], used as the storage key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Card,
    Owner,
    Controller,
    Tapped,
    SummoningSick,
    Damage,
    DeathtouchDamage,
    Counters,
    PowerToughnessModifier,
    Token,
    StackItem,
    Attacking,
    Blocking,
    AttachedTo,
}

/// A single fact about an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    /// The catalog name of the card this entity is an instance of.
    Card { name: String },
    Owner(PlayerId),
    Controller(PlayerId),
    Tapped,
    SummoningSick,
    /// Damage marked this turn.
    Damage(u32),
    /// Dealt damage by a deathtouch source this turn.
    DeathtouchDamage,
    Counters(OrdMap<CounterKind, u32>),
    /// Power/toughness changes that wear off during cleanup.
    PowerToughnessModifier { power: i32, toughness: i32 },
    Token,
    StackItem(StackItem),
    Attacking { defender: PlayerId },
    Blocking { attacker: EntityId },
    AttachedTo(EntityId),
}

impl Component {
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Card { .. } => ComponentKind::Card,
            Component::Owner(_) => ComponentKind::Owner,
            Component::Controller(_) => ComponentKind::Controller,
            Component::Tapped => ComponentKind::Tapped,
            Component::SummoningSick => ComponentKind::SummoningSick,
            Component::Damage(_) => ComponentKind::Damage,
            Component::DeathtouchDamage => ComponentKind::DeathtouchDamage,
            Component::Counters(_) => ComponentKind::Counters,
            Component::PowerToughnessModifier { .. } => ComponentKind::PowerToughnessModifier,
            Component::Token => ComponentKind::Token,
            Component::StackItem(_) => ComponentKind::StackItem,
            Component::Attacking { .. } => ComponentKind::Attacking,
            Component::Blocking { .. } => ComponentKind::Blocking,
            Component::AttachedTo(_) => ComponentKind::AttachedTo,
        }
    }
}

/// Components that only make sense while an entity is on the battlefield.
pub const BATTLEFIELD_ONLY: [ComponentKind; 9] = [
    ComponentKind::Tapped,
    ComponentKind::SummoningSick,
    ComponentKind::Damage,
    ComponentKind::DeathtouchDamage,
    ComponentKind::Counters,
    ComponentKind::PowerToughnessModifier,
    ComponentKind::Attacking,
    ComponentKind::Blocking,
    ComponentKind::AttachedTo,
];

/// The set of components attached to one entity.
///
/// ```
/// use ccg_rules::core::{Component, ComponentKind, Components, PlayerId};
///
/// let bears = Components::new()
///     .with(Component::Card { name: "Grizzly Bears".into() })
///     .with(Component::Owner(PlayerId::new(0)))
///     .with(Component::Tapped);
///
/// assert_eq!(bears.card_name(), Some("Grizzly Bears"));
/// assert!(bears.is_tapped());
/// assert!(!bears.without(ComponentKind::Tapped).is_tapped());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    map: OrdMap<ComponentKind, Component>,
}

impl Components {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: attach a component, replacing one of the same kind.
    #[must_use]
    pub fn with(mut self, component: Component) -> Self {
        self.insert(component);
        self
    }

    /// Builder: detach a component kind.
    #[must_use]
    pub fn without(mut self, kind: ComponentKind) -> Self {
        self.remove(kind);
        self
    }

    pub fn insert(&mut self, component: Component) {
        self.map.insert(component.kind(), component);
    }

    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.map.remove(&kind)
    }

    #[must_use]
    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.map.get(&kind)
    }

    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.map.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.map.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    // === Typed accessors ===

    #[must_use]
    pub fn card_name(&self) -> Option<&str> {
        match self.get(ComponentKind::Card) {
            Some(Component::Card { name }) => Some(name.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        match self.get(ComponentKind::Owner) {
            Some(Component::Owner(p)) => Some(*p),
            _ => None,
        }
    }

    /// Controller, falling back to the owner.
    #[must_use]
    pub fn controller(&self) -> Option<PlayerId> {
        match self.get(ComponentKind::Controller) {
            Some(Component::Controller(p)) => Some(*p),
            _ => self.owner(),
        }
    }

    #[must_use]
    pub fn is_tapped(&self) -> bool {
        self.has(ComponentKind::Tapped)
    }

    #[must_use]
    pub fn is_summoning_sick(&self) -> bool {
        self.has(ComponentKind::SummoningSick)
    }

    #[must_use]
    pub fn is_token(&self) -> bool {
        self.has(ComponentKind::Token)
    }

    #[must_use]
    pub fn damage(&self) -> u32 {
        match self.get(ComponentKind::Damage) {
            Some(Component::Damage(d)) => *d,
            _ => 0,
        }
    }

    #[must_use]
    pub fn counters(&self, kind: CounterKind) -> u32 {
        match self.get(ComponentKind::Counters) {
            Some(Component::Counters(c)) => c.get(&kind).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Add (positive) or remove (negative) counters, saturating at zero.
    pub fn adjust_counters(&mut self, kind: CounterKind, delta: i64) {
        let mut counters = match self.remove(ComponentKind::Counters) {
            Some(Component::Counters(c)) => c,
            _ => OrdMap::new(),
        };
        let current = i64::from(counters.get(&kind).copied().unwrap_or(0));
        let next = (current + delta).max(0) as u32;
        if next == 0 {
            counters.remove(&kind);
        } else {
            counters.insert(kind, next);
        }
        if !counters.is_empty() {
            self.insert(Component::Counters(counters));
        }
    }

    /// Accumulated until-end-of-turn power/toughness change.
    #[must_use]
    pub fn pt_modifier(&self) -> (i32, i32) {
        match self.get(ComponentKind::PowerToughnessModifier) {
            Some(Component::PowerToughnessModifier { power, toughness }) => (*power, *toughness),
            _ => (0, 0),
        }
    }

    #[must_use]
    pub fn stack_item(&self) -> Option<&StackItem> {
        match self.get(ComponentKind::StackItem) {
            Some(Component::StackItem(item)) => Some(item),
            _ => None,
        }
    }

    #[must_use]
    pub fn attacking(&self) -> Option<PlayerId> {
        match self.get(ComponentKind::Attacking) {
            Some(Component::Attacking { defender }) => Some(*defender),
            _ => None,
        }
    }

    #[must_use]
    pub fn blocking(&self) -> Option<EntityId> {
        match self.get(ComponentKind::Blocking) {
            Some(Component::Blocking { attacker }) => Some(*attacker),
            _ => None,
        }
    }

    #[must_use]
    pub fn attached_to(&self) -> Option<EntityId> {
        match self.get(ComponentKind::AttachedTo) {
            Some(Component::AttachedTo(e)) => Some(*e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_component_per_kind() {
        let c = Components::new()
            .with(Component::Damage(2))
            .with(Component::Damage(5));
        assert_eq!(c.len(), 1);
        assert_eq!(c.damage(), 5);
    }

    #[test]
    fn test_controller_falls_back_to_owner() {
        let c = Components::new().with(Component::Owner(PlayerId::new(1)));
        assert_eq!(c.controller(), Some(PlayerId::new(1)));

        let stolen = c.with(Component::Controller(PlayerId::new(0)));
        assert_eq!(stolen.controller(), Some(PlayerId::new(0)));
        assert_eq!(stolen.owner(), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_adjust_counters() {
        let mut c = Components::new();
        c.adjust_counters(CounterKind::PlusOne, 3);
        assert_eq!(c.counters(CounterKind::PlusOne), 3);

        c.adjust_counters(CounterKind::PlusOne, -5);
        assert_eq!(c.counters(CounterKind::PlusOne), 0);
        assert!(!c.has(ComponentKind::Counters));
    }

    #[test]
    fn test_clone_shares_until_write() {
        let original = Components::new().with(Component::Tapped);
        let mut copy = original.clone();
        copy.remove(ComponentKind::Tapped);

        assert!(original.is_tapped());
        assert!(!copy.is_tapped());
    }
}
