//! Example: random agent chasing "red, then green, then blue" on a grid

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rltg_agent::{GoalObservation, RandomAgent, TemporalGoalAgent, Trainer, TrainerConfig};
use rltg_core::{DiscreteSpace, Reward, Step};
use rltg_env::{
    CellColorExtractor, GridObservation, GridWorldConfig, GridWorldEnv, RewardWrapper, TimeLimit,
};
use rltg_logic::{Alphabet, ExplicitDfa, GoalEvaluator, PartialAutomatonSimulator, ShapingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional trainer config as first argument
    let config = match std::env::args().nth(1) {
        Some(path) => TrainerConfig::load(&path)
            .await
            .with_context(|| format!("loading trainer config from {path}"))?,
        None => TrainerConfig {
            num_episodes: 20,
            max_steps_per_episode: None,
        },
    };

    let env = GridWorldEnv::new(GridWorldConfig::default())?;
    let colors = ["red", "green", "blue"];
    let goal = GoalEvaluator::new(
        "red_green_blue",
        CellColorExtractor,
        PartialAutomatonSimulator::new(
            ExplicitDfa::sequence(colors, true),
            Alphabet::new(env.colors()),
            ShapingConfig::default(),
        )?,
    );
    // Keep the step cost visible next to the goal's shaping rewards.
    let env = RewardWrapper::new(env, |reward: Reward, _step: &Step<GridObservation>| {
        reward * 100.0
    });
    let env = TimeLimit::new(env, 400);

    let inner: RandomAgent<_, GoalObservation<GridObservation>> =
        RandomAgent::new(DiscreteSpace::new(GridWorldEnv::NUM_ACTIONS));
    let agent = TemporalGoalAgent::new(inner, vec![Box::new(goal)]);

    let mut trainer = Trainer::new(env, agent, config);
    let stats = trainer.train().await?;

    println!(
        "\n{} episodes, goal reached in {:.1}%, mean reward {:.2}",
        stats.len(),
        stats.goal_percentage(stats.len()),
        stats.mean_reward(stats.len())
    );
    if let Some(last) = stats.episodes().last() {
        println!("Automaton states discovered: {:?}", last.automaton_states);
    }

    trainer.close().await?;
    Ok(())
}
