//! Temporal goals for reinforcement learning agents
//!
//! A temporal goal is a condition over the trace of symbols an agent
//! observes, compiled into a deterministic automaton. This crate follows
//! such automata on the fly, learning their structure as episodes unfold,
//! and turns that partial knowledge into potential-based shaping rewards:
//!
//! - [`Symbol`], [`Interpretation`] and [`Alphabet`] describe what holds at a step
//! - [`DfaOracle`] is the automaton contract, with [`ExplicitDfa`] as a hand-built implementation
//! - [`PartialAutomatonSimulator`] discovers states and transitions and computes rewards
//! - [`RewardAutomaton`] holds the shaping potentials of the discovered structure
//! - [`TemporalEvaluator`] couples a [`FeatureExtractor`] with a simulator for the training loop

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod evaluator;
pub mod explicit;
pub mod index;
pub mod oracle;
pub mod reward_automaton;
pub mod simulator;
pub mod symbol;

pub use evaluator::{
    fold_updates, BoxedEvaluator, FeatureExtractor, GoalEvaluator, GoalSummary, GoalUpdate,
    TemporalEvaluator, TemporalGoals,
};
pub use explicit::{ExplicitDfa, ExplicitDfaBuilder, Guard};
pub use index::{StateId, StateIndex, TransitionRecord, TransitionTable};
pub use oracle::{DfaOracle, OracleCursor};
pub use reward_automaton::RewardAutomaton;
pub use simulator::{AutomatonSnapshot, PartialAutomatonSimulator, ShapingConfig};
pub use symbol::{Alphabet, Interpretation, Interpretations, Symbol};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Alphabet, DfaOracle, ExplicitDfa, FeatureExtractor, GoalEvaluator, Guard,
        PartialAutomatonSimulator, ShapingConfig, Symbol, TemporalEvaluator, TemporalGoals,
    };
}
