//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time so the binary and the
//! checked-in defaults cannot drift apart.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    training: TrainingDefaults,
    evaluation: EvaluationDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    env_id: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    c_puct: f64,
    temperature: f64,
    temp_threshold: u32,
    late_temperature: f64,
    dirichlet_alpha: f64,
    dirichlet_weight: f64,
}

#[derive(Debug, Deserialize)]
struct TrainingDefaults {
    selfplay_games: u32,
    games_per_checkpoint: u32,
    batch_size: usize,
    replay_capacity: usize,
    epochs: u32,
    learning_rate: f64,
    weight_decay: f64,
    lr_factor: f64,
    lr_patience: u32,
    hidden_sizes: Vec<usize>,
    resume: bool,
}

#[derive(Debug, Deserialize)]
struct EvaluationDefaults {
    games: u32,
    num_simulations: u32,
    c_puct: f64,
    classic_simulations: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn env_id() -> &'static str {
    &DEFAULTS.common.env_id
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn c_puct() -> f64 {
    DEFAULTS.mcts.c_puct
}
pub fn temperature() -> f64 {
    DEFAULTS.mcts.temperature
}
pub fn temp_threshold() -> u32 {
    DEFAULTS.mcts.temp_threshold
}
pub fn late_temperature() -> f64 {
    DEFAULTS.mcts.late_temperature
}
pub fn dirichlet_alpha() -> f64 {
    DEFAULTS.mcts.dirichlet_alpha
}
pub fn dirichlet_weight() -> f64 {
    DEFAULTS.mcts.dirichlet_weight
}

// Training
pub fn selfplay_games() -> u32 {
    DEFAULTS.training.selfplay_games
}
pub fn games_per_checkpoint() -> u32 {
    DEFAULTS.training.games_per_checkpoint
}
pub fn batch_size() -> usize {
    DEFAULTS.training.batch_size
}
pub fn replay_capacity() -> usize {
    DEFAULTS.training.replay_capacity
}
pub fn epochs() -> u32 {
    DEFAULTS.training.epochs
}
pub fn learning_rate() -> f64 {
    DEFAULTS.training.learning_rate
}
pub fn weight_decay() -> f64 {
    DEFAULTS.training.weight_decay
}
pub fn lr_factor() -> f64 {
    DEFAULTS.training.lr_factor
}
pub fn lr_patience() -> u32 {
    DEFAULTS.training.lr_patience
}
pub fn hidden_sizes() -> &'static [usize] {
    &DEFAULTS.training.hidden_sizes
}
pub fn resume() -> bool {
    DEFAULTS.training.resume
}

// Evaluation
pub fn eval_games() -> u32 {
    DEFAULTS.evaluation.games
}
pub fn eval_simulations() -> u32 {
    DEFAULTS.evaluation.num_simulations
}
pub fn eval_c_puct() -> f64 {
    DEFAULTS.evaluation.c_puct
}
pub fn classic_simulations() -> u32 {
    DEFAULTS.evaluation.classic_simulations
}
