//! Turn structure.
//!
//! A turn is a fixed sequence of [`Step`]s grouped into [`Phase`]s. The
//! machine in `machine` moves through them, performs each step's turn-based
//! actions and hands out priority where the step has it.

pub(crate) mod machine;
mod step;

pub use step::{Phase, Step};
