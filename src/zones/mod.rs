//! Zone system for entity locations.
//!
//! ## Key Types
//!
//! - `ZoneKind`: hand, library, battlefield, graveyard, exile, stack, command
//! - `ZoneKey`: (owner, kind); battlefield and stack are shared (`owner: None`)
//! - `Zones`: persistent location tracking and movement
//! - `ZonePosition`: position specifier for ordered zones

pub mod manager;

pub use manager::{ZonePosition, Zones};

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// The kinds of zone an entity can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Exile,
    Stack,
    Command,
}

impl ZoneKind {
    /// Is the zone shared between all players?
    #[must_use]
    pub const fn is_shared(self) -> bool {
        matches!(self, ZoneKind::Battlefield | ZoneKind::Stack)
    }
}

/// Identifies one zone: a kind plus, for per-player zones, its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    pub owner: Option<PlayerId>,
    pub kind: ZoneKind,
}

impl ZoneKey {
    /// Key for a zone kind; the owner is dropped for shared zones.
    #[must_use]
    pub const fn new(owner: PlayerId, kind: ZoneKind) -> Self {
        if kind.is_shared() {
            Self { owner: None, kind }
        } else {
            Self {
                owner: Some(owner),
                kind,
            }
        }
    }

    #[must_use]
    pub const fn battlefield() -> Self {
        Self {
            owner: None,
            kind: ZoneKind::Battlefield,
        }
    }

    #[must_use]
    pub const fn stack() -> Self {
        Self {
            owner: None,
            kind: ZoneKind::Stack,
        }
    }

    #[must_use]
    pub const fn hand(player: PlayerId) -> Self {
        Self::new(player, ZoneKind::Hand)
    }

    #[must_use]
    pub const fn library(player: PlayerId) -> Self {
        Self::new(player, ZoneKind::Library)
    }

    #[must_use]
    pub const fn graveyard(player: PlayerId) -> Self {
        Self::new(player, ZoneKind::Graveyard)
    }

    #[must_use]
    pub const fn exile(player: PlayerId) -> Self {
        Self::new(player, ZoneKind::Exile)
    }
}

impl std::fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.owner {
            Some(owner) => write!(f, "{:?}({})", self.kind, owner.0),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_zones_drop_owner() {
        assert_eq!(ZoneKey::new(PlayerId::new(1), ZoneKind::Battlefield), ZoneKey::battlefield());
        assert_eq!(ZoneKey::new(PlayerId::new(0), ZoneKind::Stack), ZoneKey::stack());
        assert_eq!(ZoneKey::hand(PlayerId::new(1)).owner, Some(PlayerId::new(1)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ZoneKey::graveyard(PlayerId::new(0)).to_string(), "Graveyard(0)");
        assert_eq!(ZoneKey::stack().to_string(), "Stack");
    }
}
