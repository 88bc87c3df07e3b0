//! Card system: definitions, catalog and mana.
//!
//! ## Key Types
//!
//! - `CardDefinition`: static card data and scripts
//! - `CardCatalog`: lookup seam by card name; `CardRegistry` implements it
//! - `ManaCost`, `ManaPool`, `PaymentStrategy`: what things cost and how to pay
//! - `ManaSolver`: payment solver seam; `BasicManaSolver` implements it

pub mod definition;
pub mod mana;
pub mod registry;

pub use definition::{
    AbilityCost, ActivatedAbility, CardDefinition, CardType, Keyword, SacrificeCost, SpellScript,
    TriggeredAbility,
};
pub use mana::{
    mana_sources, BasicManaSolver, Color, Mana, ManaCost, ManaPayment, ManaPool, ManaSolver,
    PaymentStrategy,
};
pub use registry::{CardCatalog, CardRegistry};
