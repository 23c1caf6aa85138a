//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from subdirectory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by TINYZERO_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var("TINYZERO_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from TINYZERO_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "TINYZERO_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &PathBuf) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (i32, u64, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Comma-separated list of parseable values; ignored if any item fails
    ($config:expr, $section:ident . $field:ident, $key:expr, list) => {
        if let Ok(v) = std::env::var($key) {
            let parsed: Result<Vec<_>, _> = v.split(',').map(|s| s.trim().parse()).collect();
            match parsed {
                Ok(list) => $config.$section.$field = list,
                Err(_) => warn!("Ignoring {}={}: not a comma-separated list", $key, v),
            }
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: TINYZERO_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.env_id, "TINYZERO_COMMON_ENV_ID");
    env_override!(config, common.data_dir, "TINYZERO_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "TINYZERO_COMMON_LOG_LEVEL");

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "TINYZERO_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.c_puct, "TINYZERO_MCTS_C_PUCT", parse);
    env_override!(
        config,
        mcts.temperature,
        "TINYZERO_MCTS_TEMPERATURE",
        parse
    );
    env_override!(
        config,
        mcts.temp_threshold,
        "TINYZERO_MCTS_TEMP_THRESHOLD",
        parse
    );
    env_override!(
        config,
        mcts.late_temperature,
        "TINYZERO_MCTS_LATE_TEMPERATURE",
        parse
    );
    env_override!(
        config,
        mcts.dirichlet_alpha,
        "TINYZERO_MCTS_DIRICHLET_ALPHA",
        parse
    );
    env_override!(
        config,
        mcts.dirichlet_weight,
        "TINYZERO_MCTS_DIRICHLET_WEIGHT",
        parse
    );

    // Training
    env_override!(
        config,
        training.selfplay_games,
        "TINYZERO_TRAINING_SELFPLAY_GAMES",
        parse
    );
    env_override!(
        config,
        training.games_per_checkpoint,
        "TINYZERO_TRAINING_GAMES_PER_CHECKPOINT",
        parse
    );
    env_override!(
        config,
        training.batch_size,
        "TINYZERO_TRAINING_BATCH_SIZE",
        parse
    );
    env_override!(
        config,
        training.replay_capacity,
        "TINYZERO_TRAINING_REPLAY_CAPACITY",
        parse
    );
    env_override!(config, training.epochs, "TINYZERO_TRAINING_EPOCHS", parse);
    env_override!(
        config,
        training.learning_rate,
        "TINYZERO_TRAINING_LEARNING_RATE",
        parse
    );
    env_override!(
        config,
        training.weight_decay,
        "TINYZERO_TRAINING_WEIGHT_DECAY",
        parse
    );
    env_override!(
        config,
        training.lr_factor,
        "TINYZERO_TRAINING_LR_FACTOR",
        parse
    );
    env_override!(
        config,
        training.lr_patience,
        "TINYZERO_TRAINING_LR_PATIENCE",
        parse
    );
    env_override!(
        config,
        training.hidden_sizes,
        "TINYZERO_TRAINING_HIDDEN_SIZES",
        list
    );
    env_override!(config, training.resume, "TINYZERO_TRAINING_RESUME", parse);

    // Evaluation
    env_override!(
        config,
        evaluation.games,
        "TINYZERO_EVALUATION_GAMES",
        parse
    );
    env_override!(
        config,
        evaluation.num_simulations,
        "TINYZERO_EVALUATION_NUM_SIMULATIONS",
        parse
    );
    env_override!(
        config,
        evaluation.c_puct,
        "TINYZERO_EVALUATION_C_PUCT",
        parse
    );
    env_override!(
        config,
        evaluation.classic_simulations,
        "TINYZERO_EVALUATION_CLASSIC_SIMULATIONS",
        parse
    );

    config
}
