//! Triggered abilities.
//!
//! A triggered ability is part of a card definition: a [`TriggerCondition`]
//! and a script. After every transition the engine scans the events it
//! emitted and queues a [`PendingTrigger`] for each matching ability on the
//! battlefield (or, for leaving-play conditions, the card that just left).
//! Queued triggers go on the stack the next time a player would receive
//! priority.
//!
//! ## Example
//!
//! ```
//! use ccg_rules::cards::{CardDefinition, TriggeredAbility};
//! use ccg_rules::effects::{Effect, EffectTarget};
//! use ccg_rules::triggers::TriggerCondition;
//!
//! let sprite = CardDefinition::creature("Welcome Sprite", "1W".parse().unwrap(), 1, 1)
//!     .with_triggered(TriggeredAbility::new(
//!         "When Welcome Sprite enters the battlefield, you gain 2 life.",
//!         TriggerCondition::EntersBattlefield,
//!         Effect::GainLife {
//!             amount: ccg_rules::effects::Amount::Fixed(2),
//!             target: EffectTarget::Controller,
//!         },
//!     ));
//!
//! assert_eq!(sprite.triggered[0].condition, TriggerCondition::EntersBattlefield);
//! ```

mod condition;
pub(crate) mod detect;
pub(crate) mod placement;

pub use condition::{PendingTrigger, TriggerCondition};
