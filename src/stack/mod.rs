//! The stack and priority.
//!
//! The stack is an ordinary zone (`ZoneKind::Stack`, bottom first); what
//! makes an entity a stack entry is its [`StackItem`] component. Resolution
//! is strictly last-in, first-out: only the top entry ever resolves.
//!
//! ## Protocol
//!
//! 1. Casting or activating pushes an entry; the caster keeps priority and
//!    every recorded pass is cleared
//! 2. Passing moves priority to the next player still in the game
//! 3. When all have passed in succession, the top entry resolves (or the
//!    step ends if the stack is empty) and the active player gets priority
//!
//! An entry whose chosen targets have all become illegal fizzles: it leaves
//! the stack exactly as on resolution but no effect runs.

mod item;
pub(crate) mod priority;
pub(crate) mod resolve;

pub use item::{StackItem, StackItemKind};

pub(crate) use resolve::complete;
