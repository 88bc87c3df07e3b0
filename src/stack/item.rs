//! Stack items.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// What a stack entry is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackItemKind {
    /// The card itself, cast from hand.
    Spell,
    /// Ability `index` of `source`'s definition.
    ActivatedAbility { source: EntityId, index: usize },
    TriggeredAbility { source: EntityId, index: usize },
}

/// Component on an entity in the stack zone.
///
/// A spell is its card entity carrying this component; an ability is a new
/// entity that carries its source's card name and this component, and stops
/// being tracked once it leaves the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItem {
    pub kind: StackItemKind,
    pub controller: PlayerId,
    /// Chosen targets by slot.
    pub targets: Vec<Vec<EntityId>>,
    pub x: u32,
}

impl StackItem {
    #[must_use]
    pub fn spell(controller: PlayerId) -> Self {
        Self {
            kind: StackItemKind::Spell,
            controller,
            targets: Vec::new(),
            x: 0,
        }
    }

    #[must_use]
    pub fn ability(kind: StackItemKind, controller: PlayerId, targets: Vec<Vec<EntityId>>) -> Self {
        Self {
            kind,
            controller,
            targets,
            x: 0,
        }
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.kind == StackItemKind::Spell
    }

    /// The permanent an ability came from.
    #[must_use]
    pub fn ability_source(&self) -> Option<EntityId> {
        match self.kind {
            StackItemKind::Spell => None,
            StackItemKind::ActivatedAbility { source, .. }
            | StackItemKind::TriggeredAbility { source, .. } => Some(source),
        }
    }
}
