//! Persistent zone membership.
//!
//! `Zones` tracks where every entity is and the order of each zone. It is built
//! on `im` collections, so cloning it as part of a snapshot is O(1) and each
//! write copies only the touched path.
//!
//! Every zone is ordered; order only matters for library, stack and graveyard.
//! Index 0 is the bottom, the last element is the top.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::ZoneKey;
use crate::core::EntityId;

/// Position for inserting an entity into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (e.g., top of library).
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Location index plus per-zone ordering.
///
/// ```
/// use ccg_rules::core::{EntityId, PlayerId};
/// use ccg_rules::zones::{ZoneKey, ZonePosition, Zones};
///
/// let library = ZoneKey::library(PlayerId::new(0));
/// let mut zones = Zones::default();
/// zones.insert(EntityId(10), library, ZonePosition::Top);
/// zones.insert(EntityId(11), library, ZonePosition::Bottom);
///
/// assert_eq!(zones.top(library), Some(EntityId(10)));
/// assert_eq!(zones.zone_of(EntityId(11)), Some(library));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zones {
    locations: OrdMap<EntityId, ZoneKey>,
    contents: OrdMap<ZoneKey, Vector<EntityId>>,
}

impl Zones {
    /// Put an entity that is not yet tracked into a zone.
    ///
    /// Panics if the entity is already tracked; entities are in exactly one zone.
    pub fn insert(&mut self, entity: EntityId, zone: ZoneKey, position: ZonePosition) {
        if self.locations.contains_key(&entity) {
            panic!("Entity {} is already in zone {:?}", entity, self.locations.get(&entity));
        }
        self.locations.insert(entity, zone);
        let order = self.contents.entry(zone).or_default();
        match position {
            ZonePosition::Top => order.push_back(entity),
            ZonePosition::Bottom => order.push_front(entity),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, entity);
            }
        }
    }

    /// Move an entity to another zone. Returns the zone it left.
    pub fn move_to(
        &mut self,
        entity: EntityId,
        zone: ZoneKey,
        position: ZonePosition,
    ) -> Option<ZoneKey> {
        let old = self.remove(entity)?;
        self.insert(entity, zone, position);
        Some(old)
    }

    /// Stop tracking an entity. Returns the zone it was in.
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneKey> {
        let zone = self.locations.remove(&entity)?;
        if let Some(order) = self.contents.get_mut(&zone) {
            order.retain(|&e| e != entity);
        }
        Some(zone)
    }

    /// Zone an entity is in.
    #[must_use]
    pub fn zone_of(&self, entity: EntityId) -> Option<ZoneKey> {
        self.locations.get(&entity).copied()
    }

    /// Is the entity in the given zone?
    #[must_use]
    pub fn is_in(&self, entity: EntityId, zone: ZoneKey) -> bool {
        self.locations.get(&entity) == Some(&zone)
    }

    /// Contents of a zone, bottom to top.
    #[must_use]
    pub fn contents(&self, zone: ZoneKey) -> Vector<EntityId> {
        self.contents.get(&zone).cloned().unwrap_or_default()
    }

    /// Iterate a zone bottom to top without cloning it.
    pub fn iter(&self, zone: ZoneKey) -> impl Iterator<Item = EntityId> + '_ {
        self.contents.get(&zone).into_iter().flat_map(|v| v.iter().copied())
    }

    /// Number of entities in a zone.
    #[must_use]
    pub fn size(&self, zone: ZoneKey) -> usize {
        self.contents.get(&zone).map_or(0, Vector::len)
    }

    /// The topmost entity of a zone.
    #[must_use]
    pub fn top(&self, zone: ZoneKey) -> Option<EntityId> {
        self.contents.get(&zone)?.last().copied()
    }

    /// The `n` topmost entities, topmost first.
    #[must_use]
    pub fn top_n(&self, zone: ZoneKey, n: usize) -> Vec<EntityId> {
        self.iter(zone).collect::<Vec<_>>().into_iter().rev().take(n).collect()
    }

    /// Replace the order of a zone with a permutation of its current contents.
    ///
    /// Panics if `order` is not a permutation of the zone.
    pub fn reorder(&mut self, zone: ZoneKey, order: Vector<EntityId>) {
        let mut current: Vec<_> = self.iter(zone).collect();
        let mut proposed: Vec<_> = order.iter().copied().collect();
        current.sort();
        proposed.sort();
        assert_eq!(current, proposed, "reorder of {} must be a permutation", zone);
        self.contents.insert(zone, order);
    }

    /// Total number of tracked entities.
    #[must_use]
    pub fn total(&self) -> usize {
        self.locations.len()
    }
}
