//! Combat: attacks, blocks and combat damage.
//!
//! Attacking and blocking are recorded as `Attacking`/`Blocking` components
//! on the creatures and cleared when combat ends. [`CombatState`] holds the
//! per-combat bookkeeping.

pub(crate) mod damage;
pub(crate) mod declare;
mod state;

pub use declare::{can_block, valid_attackers, valid_blockers};
pub use state::CombatState;
