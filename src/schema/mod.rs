//! Schema module - Configuration types for simulation runs.

mod config;

pub use config::*;
