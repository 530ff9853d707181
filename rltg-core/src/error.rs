//! Error types for the rltg workspace

use thiserror::Error;

/// Core error type for RL and automaton operations
#[derive(Error, Debug)]
pub enum RLError {
    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(String),

    /// Agent-related errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// Invalid action
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Malformed automaton definition
    #[error("Invalid automaton: {0}")]
    InvalidAutomaton(String),

    /// Out-of-range configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A state id that was never assigned by the simulator
    #[error("Unknown automaton state id {id} (only {known} states discovered)")]
    UnknownAutomatonState {
        /// Requested id
        id: usize,
        /// Number of ids assigned so far
        known: usize,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for rltg operations
pub type Result<T> = std::result::Result<T, RLError>;
