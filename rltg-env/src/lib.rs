//! Environments for rltg
//!
//! A colored grid world for temporal goals over visited colors, plus the
//! generic wrappers used around any [`Environment`](rltg_core::Environment).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod grid;
pub mod wrappers;

pub use grid::{CellColorExtractor, ColoredCell, GridObservation, GridWorldConfig, GridWorldEnv, Move};
pub use wrappers::{RewardWrapper, TimeLimit};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{CellColorExtractor, GridObservation, GridWorldConfig, GridWorldEnv, TimeLimit};
}
