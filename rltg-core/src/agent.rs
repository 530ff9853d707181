//! Agent traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Action, Observation, Step};

/// Core agent trait
#[async_trait]
pub trait Agent: Send + Sync {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;

    /// Select an action given an observation
    async fn act(&self, observation: &Self::Observation) -> crate::Result<Self::Action>;

    /// Process a step from the environment (for learning)
    async fn observe(&mut self, _step: &Step<Self::Observation>) -> crate::Result<()> {
        Ok(()) // Default: no learning
    }

    /// Prepare for a new episode
    fn reset(&mut self) {}

    /// Get agent metrics
    fn metrics(&self) -> AgentMetrics {
        AgentMetrics::default()
    }
}

/// Agent metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Total steps observed
    pub total_steps: usize,
    /// Total episodes started
    pub total_episodes: usize,
    /// Additional metrics
    #[serde(flatten)]
    pub custom: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiscreteAction, DiscreteObservation, Reward, StepInfo};

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        type Observation = DiscreteObservation;
        type Action = DiscreteAction;

        async fn act(&self, observation: &Self::Observation) -> crate::Result<Self::Action> {
            Ok(DiscreteAction(observation.0))
        }
    }

    #[test]
    fn test_default_methods() {
        let mut agent = Echo;
        let action = tokio_test::block_on(agent.act(&DiscreteObservation(2))).unwrap();
        assert_eq!(action, DiscreteAction(2));

        let step = Step {
            observation: DiscreteObservation(0),
            reward: Reward(0.0),
            done: true,
            truncated: false,
            info: StepInfo::default(),
        };
        tokio_test::block_on(agent.observe(&step)).unwrap();
        agent.reset();
        assert_eq!(agent.metrics(), AgentMetrics::default());
    }
}
