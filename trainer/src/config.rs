//! Command-line configuration for the trainer
//!
//! Defaults come from the central config (config.toml with TINYZERO_*
//! environment overrides); CLI arguments take highest priority.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use engine_config::{load_config, CentralConfig};
use linear_oracle::LinearOracleConfig;
use mcts::{MctsConfig, TemperatureSchedule};
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

use crate::arena::{AgentConfig, EvalMode};
use crate::self_play::SelfPlayConfig;
use crate::training::TrainingConfig;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_env_id() -> String {
    CENTRAL_CONFIG.common.env_id.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_c_puct() -> f32 {
    CENTRAL_CONFIG.mcts.c_puct as f32
}

fn default_temperature() -> f32 {
    CENTRAL_CONFIG.mcts.temperature as f32
}

fn default_temp_threshold() -> u32 {
    CENTRAL_CONFIG.mcts.temp_threshold
}

fn default_late_temperature() -> f32 {
    CENTRAL_CONFIG.mcts.late_temperature as f32
}

fn default_dirichlet_alpha() -> f32 {
    CENTRAL_CONFIG.mcts.dirichlet_alpha as f32
}

fn default_dirichlet_weight() -> f32 {
    CENTRAL_CONFIG.mcts.dirichlet_weight as f32
}

fn default_selfplay_games() -> u32 {
    CENTRAL_CONFIG.training.selfplay_games
}

fn default_games_per_checkpoint() -> u32 {
    CENTRAL_CONFIG.training.games_per_checkpoint
}

fn default_batch_size() -> usize {
    CENTRAL_CONFIG.training.batch_size
}

fn default_replay_capacity() -> usize {
    CENTRAL_CONFIG.training.replay_capacity
}

fn default_epochs() -> u32 {
    CENTRAL_CONFIG.training.epochs
}

fn default_learning_rate() -> f32 {
    CENTRAL_CONFIG.training.learning_rate as f32
}

fn default_eval_games() -> u32 {
    CENTRAL_CONFIG.evaluation.games
}

fn default_eval_simulations() -> u32 {
    CENTRAL_CONFIG.evaluation.num_simulations
}

fn default_eval_c_puct() -> f32 {
    CENTRAL_CONFIG.evaluation.c_puct as f32
}

fn default_classic_simulations() -> u32 {
    CENTRAL_CONFIG.evaluation.classic_simulations
}

#[derive(Parser, Debug, Clone)]
#[command(name = "trainer")]
#[command(about = "tinyzero trainer - self-play training and evaluation")]
#[command(
    long_about = "Trains a linear oracle by self-play with MCTS and pits trained
oracles against classic (rollout) MCTS.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train the oracle by self-play
    Train(TrainArgs),
    /// Evaluate a trained checkpoint in the arena
    Eval(EvalArgs),
    /// Play against an agent from the terminal
    Play(PlayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Environment ID to play (e.g., connect4, pylos)
    #[arg(long, global = true, default_value_t = default_env_id())]
    pub env_id: String,

    /// Data directory; checkpoints live in <data_dir>/<env_id>
    #[arg(long, global = true, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value_t = default_log_level())]
    pub log_level: String,

    /// Seed for the run's random generator (entropy when omitted)
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Number of self-play games to train on
    #[arg(long, default_value_t = default_selfplay_games())]
    pub selfplay_games: u32,

    /// Consider a checkpoint every N games (0 to disable)
    #[arg(long, default_value_t = default_games_per_checkpoint())]
    pub games_per_checkpoint: u32,

    #[arg(long, default_value_t = default_batch_size())]
    pub batch_size: usize,

    /// Replay buffer capacity in samples
    #[arg(long, default_value_t = default_replay_capacity())]
    pub replay_capacity: usize,

    /// Passes over the replay buffer per game
    #[arg(long, default_value_t = default_epochs())]
    pub epochs: u32,

    /// Number of MCTS simulations per move
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    #[arg(long, default_value_t = default_c_puct())]
    pub c_puct: f32,

    /// Root noise concentration (0 disables noise)
    #[arg(long, default_value_t = default_dirichlet_alpha())]
    pub dirichlet_alpha: f32,

    /// Fraction of each root prior replaced by noise
    #[arg(long, default_value_t = default_dirichlet_weight())]
    pub dirichlet_weight: f32,

    /// Move selection temperature
    #[arg(long, default_value_t = default_temperature())]
    pub temperature: f32,

    /// Move number after which late_temperature applies (0 to disable)
    #[arg(long, default_value_t = default_temp_threshold())]
    pub temp_threshold: u32,

    #[arg(long, default_value_t = default_late_temperature())]
    pub late_temperature: f32,

    #[arg(long, default_value_t = default_learning_rate())]
    pub learning_rate: f32,

    /// Continue from the checkpoint in <data_dir>/<env_id>
    #[arg(long)]
    pub resume: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    #[arg(long, value_enum, default_value_t = EvalMode::Classic)]
    pub mode: EvalMode,

    /// Games per pairing
    #[arg(long, default_value_t = default_eval_games())]
    pub games: u32,

    /// Simulations per move for the oracle agent
    #[arg(long, default_value_t = default_eval_simulations())]
    pub num_simulations: u32,

    #[arg(long, default_value_t = default_eval_c_puct())]
    pub c_puct: f32,

    /// Simulations per move for the classic MCTS agent
    #[arg(long, default_value_t = default_classic_simulations())]
    pub classic_simulations: u32,

    /// Root noise for the oracle agent (none when omitted)
    #[arg(long)]
    pub dirichlet_alpha: Option<f32>,
}

/// Opponent for interactive play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Opponent {
    /// Trained checkpoint from <data_dir>/<env_id>
    Oracle,
    /// Rollout-based MCTS, no checkpoint needed
    Classic,
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    #[arg(long, value_enum, default_value_t = Opponent::Oracle)]
    pub opponent: Opponent,

    /// Let the agent move first
    #[arg(long)]
    pub human_second: bool,

    /// Simulations per agent move
    #[arg(long, default_value_t = default_eval_simulations())]
    pub num_simulations: u32,

    #[arg(long, default_value_t = default_eval_c_puct())]
    pub c_puct: f32,
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        match &self.command {
            Command::Train(args) => args.validate(),
            Command::Eval(args) => args.validate(),
            Command::Play(args) => args.validate(),
        }
    }
}

impl CommonArgs {
    pub fn validate(&self) -> Result<()> {
        if self.env_id.is_empty() {
            return Err(anyhow!("env_id cannot be empty"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.env_id)
    }
}

impl TrainArgs {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }

        if self.replay_capacity == 0 {
            return Err(anyhow!("replay_capacity must be greater than 0"));
        }

        if self.replay_capacity < self.batch_size {
            return Err(anyhow!(
                "replay_capacity ({}) must hold at least one batch ({})",
                self.replay_capacity,
                self.batch_size
            ));
        }

        if self.c_puct <= 0.0 {
            return Err(anyhow!("c_puct must be positive"));
        }

        if !(0.0..=1.0).contains(&self.dirichlet_weight) {
            return Err(anyhow!("dirichlet_weight must be within [0, 1]"));
        }

        if self.learning_rate <= 0.0 {
            return Err(anyhow!("learning_rate must be positive"));
        }

        Ok(())
    }

    pub fn self_play_config(&self) -> SelfPlayConfig {
        SelfPlayConfig {
            mcts: MctsConfig {
                num_simulations: self.num_simulations,
                c_puct: self.c_puct,
                dirichlet_alpha: self.dirichlet_alpha,
                dirichlet_weight: self.dirichlet_weight,
            },
            schedule: TemperatureSchedule::constant(self.temperature)
                .with_threshold(self.temp_threshold, self.late_temperature),
        }
    }

    pub fn training_config(&self, common: &CommonArgs) -> TrainingConfig {
        TrainingConfig {
            selfplay_games: self.selfplay_games,
            games_per_checkpoint: self.games_per_checkpoint,
            batch_size: self.batch_size,
            replay_capacity: self.replay_capacity,
            epochs: self.epochs,
            checkpoint_dir: common.checkpoint_dir(),
            resume: self.resume || CENTRAL_CONFIG.training.resume,
            self_play: self.self_play_config(),
        }
    }
}

/// Network shape and optimizer settings from the central config, with the
/// learning rate from the command line when training.
pub fn oracle_config(learning_rate: Option<f32>, seed: Option<u64>) -> LinearOracleConfig {
    let training = &CENTRAL_CONFIG.training;
    LinearOracleConfig {
        hidden_sizes: training.hidden_sizes.clone(),
        learning_rate: learning_rate.unwrap_or(training.learning_rate as f32),
        weight_decay: training.weight_decay as f32,
        lr_factor: training.lr_factor as f32,
        lr_patience: training.lr_patience,
        seed: seed.unwrap_or(0),
    }
}

impl EvalArgs {
    pub fn validate(&self) -> Result<()> {
        if self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        if self.c_puct <= 0.0 {
            return Err(anyhow!("c_puct must be positive"));
        }

        Ok(())
    }

    pub fn oracle_agent(&self) -> AgentConfig {
        let config = AgentConfig::greedy(self.num_simulations, self.c_puct);
        match self.dirichlet_alpha {
            Some(alpha) => config.with_dirichlet(alpha, default_dirichlet_weight()),
            None => config,
        }
    }

    pub fn classic_agent(&self) -> AgentConfig {
        AgentConfig::greedy(self.classic_simulations, self.c_puct)
    }
}

impl PlayArgs {
    pub fn validate(&self) -> Result<()> {
        if self.num_simulations == 0 {
            return Err(anyhow!("num_simulations must be greater than 0"));
        }

        if self.c_puct <= 0.0 {
            return Err(anyhow!("c_puct must be positive"));
        }

        Ok(())
    }

    pub fn agent(&self) -> AgentConfig {
        AgentConfig::greedy(self.num_simulations, self.c_puct)
    }
}
