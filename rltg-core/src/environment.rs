//! Environment traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Action, ActionSpace, Observation, Reward};

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step<O> {
    /// Observation from the environment
    pub observation: O,
    /// Reward signal
    pub reward: Reward,
    /// Whether the episode is done
    pub done: bool,
    /// Whether the episode was truncated (e.g., time limit)
    pub truncated: bool,
    /// Additional info from the environment
    pub info: StepInfo,
}

impl<O> Step<O> {
    /// Whether this step ends the episode, for whatever reason
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.done || self.truncated
    }

    /// Replace the observation, keeping reward, flags and info
    pub fn map_observation<O2>(self, f: impl FnOnce(O) -> O2) -> Step<O2> {
        Step {
            observation: f(self.observation),
            reward: self.reward,
            done: self.done,
            truncated: self.truncated,
            info: self.info,
        }
    }
}

/// Additional information from a step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Custom fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl StepInfo {
    /// Set a field, returning `self` for chaining
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Read a boolean field, `false` when absent or not a boolean
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Configuration for environments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Random seed
    pub seed: Option<u64>,
    /// Maximum episode steps
    pub max_steps: Option<usize>,
    /// Additional parameters
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Core environment trait
#[async_trait]
pub trait Environment: Send + Sync {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;

    /// Get the action space
    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>>;

    /// Reset the environment
    async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)>;

    /// Take a step in the environment
    async fn step(&mut self, action: Self::Action) -> crate::Result<Step<Self::Observation>>;

    /// Close the environment
    async fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_info_flags() {
        let info = StepInfo::default().with("goal", true).with("lives", 3);
        assert!(info.flag("goal"));
        assert!(!info.flag("lives"));
        assert!(!info.flag("missing"));
    }

    #[test]
    fn test_map_observation_keeps_flags() {
        let step = Step {
            observation: 3_usize,
            reward: Reward(1.0),
            done: false,
            truncated: true,
            info: StepInfo::default(),
        };
        let mapped = step.map_observation(|o| o * 2);
        assert_eq!(mapped.observation, 6);
        assert!(mapped.is_last());
    }
}
