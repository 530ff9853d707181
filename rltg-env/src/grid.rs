//! Grid world with colored cells
//!
//! The agent walks on a `width x height` grid; some cells carry a color.
//! Colors are what temporal goals talk about ("visit red, then green, ..."),
//! exposed to them through [`CellColorExtractor`].

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use rltg_core::{
    ActionSpace, DiscreteAction, DiscreteSpace, Environment, EnvironmentConfig, Observation,
    RLError, Result, Reward, Step, StepInfo,
};
use rltg_logic::{FeatureExtractor, Symbol};

/// A colored cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoredCell {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// Color name, used as a symbol by temporal goals
    pub color: String,
}

/// Grid world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridWorldConfig {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Starting cell
    pub start: (usize, usize),
    /// Start every episode on a uniformly random cell instead
    pub random_start: bool,
    /// Colored cells
    pub cells: Vec<ColoredCell>,
    /// Reward given on every step
    pub step_reward: f64,
    /// Episode length
    pub max_steps: usize,
    /// Random seed
    pub seed: Option<u64>,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            start: (0, 0),
            random_start: false,
            cells: vec![
                ColoredCell { x: 4, y: 0, color: "red".into() },
                ColoredCell { x: 4, y: 4, color: "green".into() },
                ColoredCell { x: 0, y: 4, color: "blue".into() },
            ],
            step_reward: -0.01,
            max_steps: 200,
            seed: None,
        }
    }
}

impl GridWorldConfig {
    /// Override seed and episode length from a generic environment config
    #[must_use]
    pub fn with_env_config(mut self, env: &EnvironmentConfig) -> Self {
        if env.seed.is_some() {
            self.seed = env.seed;
        }
        if let Some(max_steps) = env.max_steps {
            self.max_steps = max_steps;
        }
        self
    }
}

/// What the agent sees: its position and the color under it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridObservation {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// Color of the current cell, if any
    pub color: Option<String>,
}

impl Observation for GridObservation {
    #[allow(clippy::cast_precision_loss)]
    fn to_vec(&self) -> Vec<f64> {
        vec![self.x as f64, self.y as f64]
    }
}

/// Grid world moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// `y - 1`
    Up,
    /// `y + 1`
    Down,
    /// `x - 1`
    Left,
    /// `x + 1`
    Right,
}

impl TryFrom<DiscreteAction> for Move {
    type Error = RLError;

    fn try_from(action: DiscreteAction) -> Result<Self> {
        match action.0 {
            0 => Ok(Self::Up),
            1 => Ok(Self::Down),
            2 => Ok(Self::Left),
            3 => Ok(Self::Right),
            n => Err(RLError::InvalidAction(format!("grid world has 4 actions, got {n}"))),
        }
    }
}

/// Grid world environment
pub struct GridWorldEnv {
    config: GridWorldConfig,
    position: (usize, usize),
    steps: usize,
    rng: StdRng,
}

impl GridWorldEnv {
    /// Number of actions
    pub const NUM_ACTIONS: usize = 4;

    /// Create a new grid world
    pub fn new(config: GridWorldConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(RLError::Environment("grid must have at least one cell".into()));
        }
        let in_bounds = |x: usize, y: usize| x < config.width && y < config.height;
        if !in_bounds(config.start.0, config.start.1) {
            return Err(RLError::Environment(format!(
                "start {:?} outside a {}x{} grid",
                config.start, config.width, config.height
            )));
        }
        if let Some(cell) = config.cells.iter().find(|c| !in_bounds(c.x, c.y)) {
            return Err(RLError::Environment(format!(
                "colored cell ({}, {}) outside a {}x{} grid",
                cell.x, cell.y, config.width, config.height
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            position: config.start,
            config,
            steps: 0,
            rng,
        })
    }

    /// Distinct colors on the grid
    #[must_use]
    pub fn colors(&self) -> BTreeSet<String> {
        self.config.cells.iter().map(|c| c.color.clone()).collect()
    }

    /// Current position
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &GridWorldConfig {
        &self.config
    }

    fn color_at(&self, (x, y): (usize, usize)) -> Option<String> {
        self.config
            .cells
            .iter()
            .find(|c| c.x == x && c.y == y)
            .map(|c| c.color.clone())
    }

    fn observation(&self) -> GridObservation {
        GridObservation {
            x: self.position.0,
            y: self.position.1,
            color: self.color_at(self.position),
        }
    }

    fn moved(&self, m: Move) -> (usize, usize) {
        let (x, y) = self.position;
        match m {
            Move::Up => (x, y.saturating_sub(1)),
            Move::Down => (x, (y + 1).min(self.config.height - 1)),
            Move::Left => (x.saturating_sub(1), y),
            Move::Right => ((x + 1).min(self.config.width - 1), y),
        }
    }
}

#[async_trait]
impl Environment for GridWorldEnv {
    type Observation = GridObservation;
    type Action = DiscreteAction;

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        Box::new(DiscreteSpace::new(Self::NUM_ACTIONS))
    }

    async fn reset(&mut self) -> Result<(Self::Observation, StepInfo)> {
        self.position = if self.config.random_start {
            (
                self.rng.gen_range(0..self.config.width),
                self.rng.gen_range(0..self.config.height),
            )
        } else {
            self.config.start
        };
        self.steps = 0;
        debug!(x = self.position.0, y = self.position.1, "grid world reset");

        Ok((self.observation(), StepInfo::default()))
    }

    async fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>> {
        let m = Move::try_from(action)?;
        self.position = self.moved(m);
        self.steps += 1;

        let observation = self.observation();
        let mut info = StepInfo::default().with("steps", self.steps);
        if let Some(color) = &observation.color {
            info = info.with("color", color.clone());
        }

        let out_of_time = self.steps >= self.config.max_steps;
        if out_of_time {
            debug!(steps = self.steps, "grid world episode out of time");
        }
        Ok(Step {
            observation,
            reward: Reward(self.config.step_reward),
            done: out_of_time,
            truncated: out_of_time,
            info,
        })
    }
}

/// Feature extractor reporting the color under the agent
#[derive(Debug, Clone, Copy, Default)]
pub struct CellColorExtractor;

impl FeatureExtractor<GridObservation> for CellColorExtractor {
    fn extract(&self, observation: &GridObservation) -> Vec<Symbol> {
        observation.color.iter().map(|c| Symbol::from(c.as_str())).collect()
    }
}
