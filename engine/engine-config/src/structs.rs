//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_env_id() -> String {
    defaults::env_id().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_c_puct() -> f64 {
    defaults::c_puct()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}
fn d_temp_threshold() -> u32 {
    defaults::temp_threshold()
}
fn d_late_temperature() -> f64 {
    defaults::late_temperature()
}
fn d_dirichlet_alpha() -> f64 {
    defaults::dirichlet_alpha()
}
fn d_dirichlet_weight() -> f64 {
    defaults::dirichlet_weight()
}
fn d_selfplay_games() -> u32 {
    defaults::selfplay_games()
}
fn d_games_per_ckpt() -> u32 {
    defaults::games_per_checkpoint()
}
fn d_batch_size() -> usize {
    defaults::batch_size()
}
fn d_replay_capacity() -> usize {
    defaults::replay_capacity()
}
fn d_epochs() -> u32 {
    defaults::epochs()
}
fn d_lr() -> f64 {
    defaults::learning_rate()
}
fn d_weight_decay() -> f64 {
    defaults::weight_decay()
}
fn d_lr_factor() -> f64 {
    defaults::lr_factor()
}
fn d_lr_patience() -> u32 {
    defaults::lr_patience()
}
fn d_hidden_sizes() -> Vec<usize> {
    defaults::hidden_sizes().to_vec()
}
fn d_resume() -> bool {
    defaults::resume()
}
fn d_eval_games() -> u32 {
    defaults::eval_games()
}
fn d_eval_sims() -> u32 {
    defaults::eval_simulations()
}
fn d_eval_c_puct() -> f64 {
    defaults::eval_c_puct()
}
fn d_classic_sims() -> u32 {
    defaults::classic_simulations()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Common configuration shared by all commands
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_env_id")]
    pub env_id: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            env_id: defaults::env_id().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// Self-play search settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
    /// Moves played at `temperature` before switching to `late_temperature`
    /// (0 = never switch)
    #[serde(default = "d_temp_threshold")]
    pub temp_threshold: u32,
    #[serde(default = "d_late_temperature")]
    pub late_temperature: f64,
    /// Root noise concentration; 0 disables noise
    #[serde(default = "d_dirichlet_alpha")]
    pub dirichlet_alpha: f64,
    #[serde(default = "d_dirichlet_weight")]
    pub dirichlet_weight: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            c_puct: defaults::c_puct(),
            temperature: defaults::temperature(),
            temp_threshold: defaults::temp_threshold(),
            late_temperature: defaults::late_temperature(),
            dirichlet_alpha: defaults::dirichlet_alpha(),
            dirichlet_weight: defaults::dirichlet_weight(),
        }
    }
}

/// Training loop and oracle hyperparameters
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrainingConfig {
    #[serde(default = "d_selfplay_games")]
    pub selfplay_games: u32,
    #[serde(default = "d_games_per_ckpt")]
    pub games_per_checkpoint: u32,
    #[serde(default = "d_batch_size")]
    pub batch_size: usize,
    #[serde(default = "d_replay_capacity")]
    pub replay_capacity: usize,
    #[serde(default = "d_epochs")]
    pub epochs: u32,
    #[serde(default = "d_lr")]
    pub learning_rate: f64,
    #[serde(default = "d_weight_decay")]
    pub weight_decay: f64,
    #[serde(default = "d_lr_factor")]
    pub lr_factor: f64,
    #[serde(default = "d_lr_patience")]
    pub lr_patience: u32,
    #[serde(default = "d_hidden_sizes")]
    pub hidden_sizes: Vec<usize>,
    /// Continue from the checkpoint in the data directory
    #[serde(default = "d_resume")]
    pub resume: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            selfplay_games: defaults::selfplay_games(),
            games_per_checkpoint: defaults::games_per_checkpoint(),
            batch_size: defaults::batch_size(),
            replay_capacity: defaults::replay_capacity(),
            epochs: defaults::epochs(),
            learning_rate: defaults::learning_rate(),
            weight_decay: defaults::weight_decay(),
            lr_factor: defaults::lr_factor(),
            lr_patience: defaults::lr_patience(),
            hidden_sizes: defaults::hidden_sizes().to_vec(),
            resume: defaults::resume(),
        }
    }
}

/// Arena evaluation settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EvaluationConfig {
    #[serde(default = "d_eval_games")]
    pub games: u32,
    /// Simulations for the oracle-guided agent
    #[serde(default = "d_eval_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_eval_c_puct")]
    pub c_puct: f64,
    /// Simulations for the rollout-based classic MCTS agent
    #[serde(default = "d_classic_sims")]
    pub classic_simulations: u32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            games: defaults::eval_games(),
            num_simulations: defaults::eval_simulations(),
            c_puct: defaults::eval_c_puct(),
            classic_simulations: defaults::classic_simulations(),
        }
    }
}
