//! Compute module - Cell state, transition rules and the generation driver.

mod cell;
mod grid;
mod rule;

pub use cell::*;
pub use grid::*;
pub use rule::*;
