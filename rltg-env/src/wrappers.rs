//! Environment wrappers for common transformations

use async_trait::async_trait;

use rltg_core::{ActionSpace, Environment, Reward, Step, StepInfo};

/// Wrapper that modifies rewards
pub struct RewardWrapper<E, F> {
    /// Inner environment
    pub env: E,
    /// Reward transformation function
    pub reward_fn: F,
}

impl<E, F> RewardWrapper<E, F> {
    /// Wrap `env`, passing every reward through `reward_fn`
    pub fn new(env: E, reward_fn: F) -> Self {
        Self { env, reward_fn }
    }
}

#[async_trait]
impl<E, F> Environment for RewardWrapper<E, F>
where
    E: Environment,
    F: Fn(Reward, &Step<E::Observation>) -> Reward + Send + Sync,
{
    type Observation = E::Observation;
    type Action = E::Action;

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        self.env.action_space()
    }

    async fn reset(&mut self) -> rltg_core::Result<(Self::Observation, StepInfo)> {
        self.env.reset().await
    }

    async fn step(&mut self, action: Self::Action) -> rltg_core::Result<Step<Self::Observation>> {
        let mut step = self.env.step(action).await?;
        step.reward = (self.reward_fn)(step.reward, &step);
        Ok(step)
    }

    async fn close(&mut self) -> rltg_core::Result<()> {
        self.env.close().await
    }
}

/// Time limit wrapper
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum steps
    pub max_steps: usize,
    /// Current step count
    pub steps: usize,
}

impl<E> TimeLimit<E> {
    /// Create a new time limit wrapper
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            steps: 0,
        }
    }
}

#[async_trait]
impl<E> Environment for TimeLimit<E>
where
    E: Environment,
{
    type Observation = E::Observation;
    type Action = E::Action;

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        self.env.action_space()
    }

    async fn reset(&mut self) -> rltg_core::Result<(Self::Observation, StepInfo)> {
        self.steps = 0;
        self.env.reset().await
    }

    async fn step(&mut self, action: Self::Action) -> rltg_core::Result<Step<Self::Observation>> {
        self.steps += 1;
        let mut step = self.env.step(action).await?;

        if self.steps >= self.max_steps && !step.done {
            step.truncated = true;
        }

        Ok(step)
    }

    async fn close(&mut self) -> rltg_core::Result<()> {
        self.env.close().await
    }
}
