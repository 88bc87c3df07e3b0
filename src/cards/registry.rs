//! Card catalog lookup.
//!
//! The engine consumes card data through the narrow [`CardCatalog`] trait.
//! `CardRegistry` is the bundled in-memory catalog keyed by card name.

use rustc_hash::FxHashMap;

use super::definition::CardDefinition;

/// Lookup of card definitions by name.
pub trait CardCatalog: Send + Sync {
    fn definition_for(&self, name: &str) -> Option<&CardDefinition>;
}

/// In-memory card catalog.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardCatalog, CardDefinition, CardRegistry};
///
/// let registry = CardRegistry::new()
///     .with(CardDefinition::creature("Grizzly Bears", "1G".parse().unwrap(), 2, 2));
///
/// let bears = registry.definition_for("Grizzly Bears").unwrap();
/// assert_eq!(bears.power, Some(2));
/// assert!(registry.definition_for("Black Lotus").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, CardDefinition>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same name already exists.
    pub fn register(&mut self, card: CardDefinition) {
        if self.cards.contains_key(&card.name) {
            panic!("Card '{}' already registered", card.name);
        }
        self.cards.insert(card.name.clone(), card);
    }

    /// Register a card (builder pattern).
    #[must_use]
    pub fn with(mut self, card: CardDefinition) -> Self {
        self.register(card);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    /// Find cards matching a predicate.
    pub fn find<F>(&self, predicate: F) -> impl Iterator<Item = &CardDefinition>
    where
        F: Fn(&CardDefinition) -> bool,
    {
        self.cards.values().filter(move |c| predicate(c))
    }
}

impl CardCatalog for CardRegistry {
    fn definition_for(&self, name: &str) -> Option<&CardDefinition> {
        self.get(name)
    }
}
