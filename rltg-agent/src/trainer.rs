//! Training loop with temporal-goal reward folding
//!
//! Each step the temporal goals of the agent are advanced on the new
//! observation, their shaping rewards are added to the environment reward,
//! and a failed goal ends the episode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use rltg_core::{Agent, Environment, Result};
use rltg_logic::{fold_updates, TemporalGoals};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Number of episodes to run
    pub num_episodes: usize,
    /// Step budget per episode, on top of the environment's own limits
    pub max_steps_per_episode: Option<usize>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            max_steps_per_episode: None,
        }
    }
}

impl TrainerConfig {
    /// Load a configuration from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the configuration as JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Summary of one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Episode index, from 0
    pub episode: usize,
    /// Sum of environment and temporal-goal rewards
    pub total_reward: f64,
    /// Steps taken
    pub steps: usize,
    /// Whether the goal was reached
    pub goal: bool,
    /// Whether a temporal goal failed
    pub goal_failed: bool,
    /// Automaton states discovered so far, per temporal goal
    pub automaton_states: Vec<usize>,
    /// When the episode started
    pub started_at: DateTime<Utc>,
    /// When the episode ended
    pub finished_at: DateTime<Utc>,
}

/// Per-episode training history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    episodes: Vec<EpisodeRecord>,
}

impl TrainingStats {
    /// Create empty statistics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an episode
    pub fn record(&mut self, record: EpisodeRecord) {
        self.episodes.push(record);
    }

    /// All recorded episodes
    #[must_use]
    pub fn episodes(&self) -> &[EpisodeRecord] {
        &self.episodes
    }

    /// Number of recorded episodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    /// Whether no episode was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    fn last(&self, window: usize) -> &[EpisodeRecord] {
        &self.episodes[self.episodes.len().saturating_sub(window)..]
    }

    /// Percentage of goal-reaching episodes among the last `window`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn goal_percentage(&self, window: usize) -> f64 {
        let recent = self.last(window);
        if recent.is_empty() {
            return 0.0;
        }
        let goals = recent.iter().filter(|e| e.goal).count();
        goals as f64 / recent.len() as f64 * 100.0
    }

    /// Mean total reward of the last `window` episodes
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_reward(&self, window: usize) -> f64 {
        let recent = self.last(window);
        if recent.is_empty() {
            return 0.0;
        }
        recent.iter().map(|e| e.total_reward).sum::<f64>() / recent.len() as f64
    }
}

/// Condition checked after every episode; training stops once all hold
pub trait StoppingCondition: Send + Sync {
    /// Whether training may stop given `stats`
    fn should_stop(&self, stats: &TrainingStats) -> bool;
}

impl<F> StoppingCondition for F
where
    F: Fn(&TrainingStats) -> bool + Send + Sync,
{
    fn should_stop(&self, stats: &TrainingStats) -> bool {
        self(stats)
    }
}

/// Stop once the recent goal percentage reaches a threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalPercentageThreshold {
    /// Required goal percentage, in `[0, 100]`
    pub threshold: f64,
    /// Number of most recent episodes considered
    pub window: usize,
}

impl Default for GoalPercentageThreshold {
    fn default() -> Self {
        Self {
            threshold: 97.0,
            window: 100,
        }
    }
}

impl StoppingCondition for GoalPercentageThreshold {
    fn should_stop(&self, stats: &TrainingStats) -> bool {
        stats.len() >= self.window && stats.goal_percentage(self.window) >= self.threshold
    }
}

/// Runs episodes of an agent in an environment
pub struct Trainer<E, A> {
    env: E,
    agent: A,
    config: TrainerConfig,
    stopping_conditions: Vec<Box<dyn StoppingCondition>>,
    stats: TrainingStats,
}

impl<E, A> Trainer<E, A>
where
    E: Environment,
    A: Agent<Observation = E::Observation, Action = E::Action> + TemporalGoals<E::Observation>,
{
    /// Create a trainer stopping on [`GoalPercentageThreshold::default`]
    pub fn new(env: E, agent: A, config: TrainerConfig) -> Self {
        Self {
            env,
            agent,
            config,
            stopping_conditions: vec![Box::new(GoalPercentageThreshold::default())],
            stats: TrainingStats::new(),
        }
    }

    /// Replace the stopping conditions; an empty list runs every episode
    #[must_use]
    pub fn with_stopping_conditions(mut self, conditions: Vec<Box<dyn StoppingCondition>>) -> Self {
        self.stopping_conditions = conditions;
        self
    }

    /// Run up to `num_episodes` episodes
    pub async fn train(&mut self) -> Result<&TrainingStats> {
        info!(episodes = self.config.num_episodes, "starting training");

        for _ in 0..self.config.num_episodes {
            self.run_episode().await?;

            if !self.stopping_conditions.is_empty()
                && self
                    .stopping_conditions
                    .iter()
                    .all(|c| c.should_stop(&self.stats))
            {
                info!(episodes = self.stats.len(), "stopping conditions met");
                break;
            }
        }

        Ok(&self.stats)
    }

    /// Run and record a single episode
    pub async fn run_episode(&mut self) -> Result<EpisodeRecord> {
        let started_at = Utc::now();
        let (mut observation, _info) = self.env.reset().await?;
        self.agent.reset();

        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut env_goal = false;
        let mut goal_failed = false;

        loop {
            let action = self.agent.act(&observation).await?;
            let mut step = self.env.step(action).await?;
            steps += 1;

            let goals = fold_updates(self.agent.temporal_evaluators(), &step.observation);
            step.reward += goals.reward;
            if goals.any_failed {
                debug!(steps, "temporal goal failed");
                goal_failed = true;
                step.done = true;
            }
            env_goal |= step.info.flag("goal");
            total_reward += step.reward.value();

            self.agent.observe(&step).await?;

            let out_of_budget = self
                .config
                .max_steps_per_episode
                .is_some_and(|max| steps >= max);
            if step.is_last() || out_of_budget {
                break;
            }
            observation = step.observation;
        }

        let evaluators = self.agent.temporal_evaluators();
        let goal = if evaluators.is_empty() {
            env_goal
        } else {
            evaluators.iter().all(|e| e.is_true())
        };
        let automaton_states = evaluators.iter().map(|e| e.num_states()).collect();

        let record = EpisodeRecord {
            episode: self.stats.len(),
            total_reward,
            steps,
            goal,
            goal_failed,
            automaton_states,
            started_at,
            finished_at: Utc::now(),
        };
        self.stats.record(record.clone());
        info!(
            episode = record.episode,
            total_reward = record.total_reward,
            steps = record.steps,
            goal = record.goal,
            automaton_states = ?record.automaton_states,
            goal_percentage = self.stats.goal_percentage(100),
            "episode finished"
        );

        Ok(record)
    }

    /// Close the environment
    pub async fn close(&mut self) -> Result<()> {
        self.env.close().await
    }

    /// Training history
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// The agent
    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// The environment
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Configuration
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }
}
