//! Agents pursuing temporal goals
//!
//! [`TemporalGoalAgent`] owns the temporal evaluators and hands its inner agent
//! the product of the environment observation with the automaton state of
//! every goal, so the inner policy can tell apart situations that look the
//! same but sit at different points of a goal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use rltg_core::agent::AgentMetrics;
use rltg_core::{Agent, Observation, Step};
use rltg_logic::{BoxedEvaluator, StateId, TemporalGoals};

/// Environment observation extended with the automaton state of each goal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalObservation<O> {
    /// Observation from the environment
    pub observation: O,
    /// Current automaton state id of each goal, in evaluator order
    pub automaton_states: Vec<StateId>,
}

impl<O: Observation> Observation for GoalObservation<O> {
    #[allow(clippy::cast_precision_loss)]
    fn to_vec(&self) -> Vec<f64> {
        let mut features = self.observation.to_vec();
        features.extend(self.automaton_states.iter().map(|&q| q as f64));
        features
    }
}

/// Agent wrapper that owns temporal goals
pub struct TemporalGoalAgent<A, O> {
    inner: A,
    evaluators: Vec<BoxedEvaluator<O>>,
    states: Vec<StateId>,
}

impl<A, O> TemporalGoalAgent<A, O> {
    /// Wrap `inner` with `evaluators`
    pub fn new(inner: A, mut evaluators: Vec<BoxedEvaluator<O>>) -> Self {
        let states = evaluators.iter_mut().map(|e| e.current_state()).collect();
        Self {
            inner,
            evaluators,
            states,
        }
    }

    /// The wrapped agent
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Mutable access to the wrapped agent
    pub fn inner_mut(&mut self) -> &mut A {
        &mut self.inner
    }

    /// Automaton state of each goal as last seen by the inner agent
    pub fn automaton_states(&self) -> &[StateId] {
        &self.states
    }

    fn refresh_states(&mut self) {
        self.states.clear();
        self.states
            .extend(self.evaluators.iter_mut().map(|e| e.current_state()));
    }
}

impl<A, O: Clone> TemporalGoalAgent<A, O> {
    fn product(&self, observation: &O) -> GoalObservation<O> {
        GoalObservation {
            observation: observation.clone(),
            automaton_states: self.states.clone(),
        }
    }
}

#[async_trait]
impl<A, O> Agent for TemporalGoalAgent<A, O>
where
    O: Observation + 'static,
    A: Agent<Observation = GoalObservation<O>>,
{
    type Observation = O;
    type Action = A::Action;

    async fn act(&self, observation: &Self::Observation) -> rltg_core::Result<Self::Action> {
        let product = self.product(observation);
        self.inner.act(&product).await
    }

    async fn observe(&mut self, step: &Step<Self::Observation>) -> rltg_core::Result<()> {
        // Evaluators were advanced on this step by the training loop.
        self.refresh_states();
        let states = self.states.clone();
        let step = step.clone().map_observation(|observation| GoalObservation {
            observation,
            automaton_states: states,
        });
        self.inner.observe(&step).await
    }

    fn reset(&mut self) {
        for evaluator in &mut self.evaluators {
            evaluator.reset();
        }
        self.refresh_states();
        self.inner.reset();
    }

    fn metrics(&self) -> AgentMetrics {
        let mut metrics = self.inner.metrics();
        for evaluator in &self.evaluators {
            metrics.custom.insert(
                format!("{}_automaton_states", evaluator.name()),
                evaluator.num_states().into(),
            );
        }
        metrics
    }
}

impl<A, O> TemporalGoals<O> for TemporalGoalAgent<A, O> {
    fn temporal_evaluators(&mut self) -> &mut [BoxedEvaluator<O>] {
        &mut self.evaluators
    }
}
