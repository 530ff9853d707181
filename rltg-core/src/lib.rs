//! Core reinforcement learning traits and types for rltg
//!
//! This crate provides the vocabulary shared by the temporal-goal machinery,
//! the environments and the agents: rewards, actions, observations, and the
//! environment/agent traits driven by the training loop.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod agent;
pub mod environment;
pub mod error;
pub mod observation;
pub mod reward;

// Re-export core traits and types
pub use action::{Action, ActionSpace, DiscreteAction, DiscreteSpace};
pub use agent::Agent;
pub use environment::{Environment, EnvironmentConfig, Step, StepInfo};
pub use error::{RLError, Result};
pub use observation::{DiscreteObservation, Observation};
pub use reward::{potential_shaping, Reward};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionSpace, Agent, DiscreteAction, DiscreteSpace, Environment,
        Observation, Result, Reward, Step, StepInfo,
    };
}
