//! Combat bookkeeping stored on the snapshot.
//!
//! Which creature attacks or blocks is a component on the creature itself
//! (`Attacking`, `Blocking`); this struct keeps only what belongs to the
//! combat as a whole.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// The active player has declared attackers this combat.
    pub attackers_declared: bool,
    /// Players being attacked; each declares blockers.
    pub defenders: OrdSet<PlayerId>,
    pub blockers_declared: OrdSet<PlayerId>,
    /// Attackers that were blocked, even if their blockers have since left.
    pub blocked: OrdSet<EntityId>,
    /// Damage assignment order chosen by an attacker's controller.
    pub blocker_order: OrdMap<EntityId, Vector<EntityId>>,
    /// This combat has a first-strike damage step.
    pub first_strike_step: bool,
}

impl CombatState {
    #[must_use]
    pub fn is_blocked(&self, attacker: EntityId) -> bool {
        self.blocked.contains(&attacker)
    }

    /// The next defending player, in `order`, still to declare blockers.
    #[must_use]
    pub fn next_to_block(&self, order: impl IntoIterator<Item = PlayerId>) -> Option<PlayerId> {
        order
            .into_iter()
            .find(|p| self.defenders.contains(p) && !self.blockers_declared.contains(p))
    }

    #[must_use]
    pub fn all_blockers_declared(&self) -> bool {
        self.defenders.iter().all(|p| self.blockers_declared.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_to_block_follows_order() {
        let mut combat = CombatState::default();
        combat.defenders.insert(PlayerId::new(1));
        combat.defenders.insert(PlayerId::new(2));

        let order = PlayerId::apnap(PlayerId::new(0), 3);
        assert_eq!(combat.next_to_block(order), Some(PlayerId::new(1)));

        combat.blockers_declared.insert(PlayerId::new(1));
        assert_eq!(combat.next_to_block(PlayerId::apnap(PlayerId::new(0), 3)), Some(PlayerId::new(2)));
        assert!(!combat.all_blockers_declared());

        combat.blockers_declared.insert(PlayerId::new(2));
        assert!(combat.all_blockers_declared());
    }
}
