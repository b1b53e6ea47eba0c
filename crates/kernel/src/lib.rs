//! World Kernel: authoritative block map the renderer draws from.
//!
//! # Invariants
//! - All block and environment mutations flow through explicit operations.
//! - Every mutation produces an event record for the renderer to consume.
//! - The light heightmap always reflects the current block contents.

pub mod env;
pub mod map;

pub use env::{Colour, EnvVariable, MapEnv};
pub use map::{BlockChange, BlockMap, MapError, MapEvent};
