//! Agents and training loop for rltg
//!
//! This crate provides:
//! - A random baseline agent
//! - An agent wrapper owning temporal goals and exposing their automaton states
//! - The training loop, its statistics and stopping conditions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod random;
pub mod temporal;
pub mod trainer;

pub use random::RandomAgent;
pub use temporal::{GoalObservation, TemporalGoalAgent};
pub use trainer::{
    EpisodeRecord, GoalPercentageThreshold, StoppingCondition, Trainer, TrainerConfig,
    TrainingStats,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        GoalObservation, GoalPercentageThreshold, RandomAgent, StoppingCondition,
        TemporalGoalAgent, Trainer, TrainerConfig,
    };
}
