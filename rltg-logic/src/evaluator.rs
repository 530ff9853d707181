//! Temporal goals evaluated alongside the base task

use serde::{Deserialize, Serialize};

use crate::{DfaOracle, PartialAutomatonSimulator, StateId, Symbol};

/// Maps a raw observation to the symbols that hold in it
pub trait FeatureExtractor<O>: Send + Sync {
    /// Symbols true in `observation`
    fn extract(&self, observation: &O) -> Vec<Symbol>;
}

impl<O, F> FeatureExtractor<O> for F
where
    F: Fn(&O) -> Vec<Symbol> + Send + Sync,
{
    fn extract(&self, observation: &O) -> Vec<Symbol> {
        self(observation)
    }
}

/// Outcome of feeding one observation to a temporal goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalUpdate {
    /// Shaping reward for this step
    pub reward: f64,
    /// The goal can no longer be satisfied
    pub failed: bool,
    /// The goal is satisfied by the trace so far
    pub satisfied: bool,
    /// Automaton state after the step
    pub state: StateId,
}

/// A temporal goal polled once per environment step
pub trait TemporalEvaluator<O>: Send + Sync {
    /// Name used in logs and statistics
    fn name(&self) -> &str;

    /// Start a new episode
    fn reset(&mut self);

    /// Feed one observation
    fn update(&mut self, observation: &O) -> GoalUpdate;

    /// Whether the goal has failed in the current episode
    fn is_failed(&self) -> bool;

    /// Whether the goal is currently satisfied
    fn is_true(&self) -> bool;

    /// Automaton state of the current episode
    fn current_state(&mut self) -> StateId;

    /// Number of automaton states discovered so far
    fn num_states(&self) -> usize;
}

/// Boxed evaluator as stored by agents
pub type BoxedEvaluator<O> = Box<dyn TemporalEvaluator<O>>;

/// Temporal goal made of a feature extractor and an automaton simulator
#[derive(Debug)]
pub struct GoalEvaluator<F, D: DfaOracle> {
    name: String,
    extractor: F,
    simulator: PartialAutomatonSimulator<D>,
}

impl<F, D: DfaOracle> GoalEvaluator<F, D> {
    /// Create a new evaluator
    pub fn new(name: impl Into<String>, extractor: F, simulator: PartialAutomatonSimulator<D>) -> Self {
        Self {
            name: name.into(),
            extractor,
            simulator,
        }
    }

    /// The underlying simulator
    pub fn simulator(&self) -> &PartialAutomatonSimulator<D> {
        &self.simulator
    }
}

impl<O, F, D> TemporalEvaluator<O> for GoalEvaluator<F, D>
where
    F: FeatureExtractor<O>,
    D: DfaOracle + Send + Sync,
    D::State: Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.simulator.reset();
    }

    fn update(&mut self, observation: &O) -> GoalUpdate {
        let symbols = self.extractor.extract(observation);
        let reward = self.simulator.make_transition(symbols);
        GoalUpdate {
            reward,
            failed: self.simulator.is_failed(),
            satisfied: self.simulator.is_true(),
            state: self.simulator.get_cur_state(),
        }
    }

    fn is_failed(&self) -> bool {
        self.simulator.is_failed()
    }

    fn is_true(&self) -> bool {
        self.simulator.is_true()
    }

    fn current_state(&mut self) -> StateId {
        self.simulator.get_cur_state()
    }

    fn num_states(&self) -> usize {
        self.simulator.num_states()
    }
}

/// Capability of agents that pursue temporal goals.
///
/// Agents without temporal goals keep the default, which exposes none.
pub trait TemporalGoals<O> {
    /// The agent's temporal goals
    fn temporal_evaluators(&mut self) -> &mut [BoxedEvaluator<O>] {
        Default::default()
    }
}

/// Combined outcome of all temporal goals for one step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSummary {
    /// Sum of the shaping rewards
    pub reward: f64,
    /// At least one goal failed
    pub any_failed: bool,
    /// There is at least one goal and every goal is satisfied
    pub all_satisfied: bool,
    /// Automaton state of each goal, in evaluator order
    pub states: Vec<StateId>,
}

/// Poll every evaluator once with `observation` and combine the outcomes
pub fn fold_updates<O>(evaluators: &mut [BoxedEvaluator<O>], observation: &O) -> GoalSummary {
    let mut summary = GoalSummary {
        all_satisfied: !evaluators.is_empty(),
        ..GoalSummary::default()
    };
    for evaluator in evaluators.iter_mut() {
        let update = evaluator.update(observation);
        summary.reward += update.reward;
        summary.any_failed |= update.failed;
        summary.all_satisfied &= update.satisfied;
        summary.states.push(update.state);
    }
    summary
}
