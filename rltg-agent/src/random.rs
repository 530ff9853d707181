//! Random agent for baseline comparisons

use async_trait::async_trait;
use std::marker::PhantomData;

use rltg_core::agent::AgentMetrics;
use rltg_core::{ActionSpace, Agent, Observation, Step};
use rltg_logic::TemporalGoals;

/// Random agent that selects actions uniformly at random
pub struct RandomAgent<S, O> {
    /// Action space
    action_space: S,
    steps: usize,
    episodes: usize,
    _observation: PhantomData<fn(&O)>,
}

impl<S: ActionSpace, O> RandomAgent<S, O> {
    /// Create a new random agent
    pub fn new(action_space: S) -> Self {
        Self {
            action_space,
            steps: 0,
            episodes: 0,
            _observation: PhantomData,
        }
    }

    /// The space actions are drawn from
    pub fn action_space(&self) -> &S {
        &self.action_space
    }
}

#[async_trait]
impl<S, O> Agent for RandomAgent<S, O>
where
    S: ActionSpace,
    O: Observation,
{
    type Observation = O;
    type Action = S::Action;

    async fn act(&self, _observation: &Self::Observation) -> rltg_core::Result<Self::Action> {
        Ok(self.action_space.sample())
    }

    async fn observe(&mut self, _step: &Step<Self::Observation>) -> rltg_core::Result<()> {
        // Random agent doesn't learn from experience
        self.steps += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.episodes += 1;
    }

    fn metrics(&self) -> AgentMetrics {
        AgentMetrics {
            total_steps: self.steps,
            total_episodes: self.episodes,
            ..AgentMetrics::default()
        }
    }
}

impl<S, O> TemporalGoals<O> for RandomAgent<S, O> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rltg_core::{DiscreteObservation, DiscreteSpace};

    #[tokio::test]
    async fn test_actions_stay_in_space() {
        let mut agent: RandomAgent<_, DiscreteObservation> = RandomAgent::new(DiscreteSpace::new(3));
        for _ in 0..50 {
            let action = agent.act(&DiscreteObservation(0)).await.unwrap();
            assert!(agent.action_space().contains(&action));
        }
        assert!(agent.temporal_evaluators().is_empty());
    }
}
