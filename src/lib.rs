//! Lifelike - Life-like cellular automata on a bounded grid.
//!
//! A rectangular grid of two-state cells evolves generation by generation
//! under a configurable birth/survival rule. Initial content comes from
//! Life 1.05, Life 1.06 or RLE pattern files.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Configuration types for simulation runs
//! - `compute`: Cells, rules and the generation-advance driver
//! - `pattern`: The loader contract and the three pattern parsers
//!
//! # Example
//!
//! ```rust
//! use lifelike::{
//!     compute::{CellState, GameRule, Grid},
//!     pattern::{GridLoader, RleLoader},
//! };
//!
//! let loader: RleLoader = "x = 3, y = 3, rule = B3/S23\n$3o!".parse().unwrap();
//! let mut grid = Grid::from_loader(&loader).unwrap();
//!
//! let rule = loader.game_rule().unwrap_or_else(GameRule::conway);
//! grid.advance_generation(&rule).unwrap();
//!
//! assert_eq!(grid.get(1, 0).unwrap(), CellState::Alive);
//! assert_eq!(grid.get(0, 1).unwrap(), CellState::Dead);
//! ```

pub mod compute;
pub mod pattern;
pub mod schema;

// Re-export commonly used types
pub use compute::{CONWAY, CellState, GameRule, Grid, GridError, GridStats};
pub use pattern::{GridLoader, PatternError, PatternFile};
pub use schema::{PatternFormat, SimulationConfig};
