//! Tests for the configuration module.

use super::*;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.env_id, "connect4");
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.mcts.num_simulations, 64);
}

#[test]
fn test_training_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.training.selfplay_games, 400);
    assert_eq!(config.training.games_per_checkpoint, 50);
    assert_eq!(config.training.batch_size, 128);
    assert_eq!(config.training.replay_capacity, 512);
    assert_eq!(config.training.epochs, 3);
    assert!((config.training.learning_rate - 0.001).abs() < f64::EPSILON);
    assert!((config.training.weight_decay - 0.0001).abs() < f64::EPSILON);
    assert!((config.training.lr_factor - 0.1).abs() < f64::EPSILON);
    assert_eq!(config.training.lr_patience, 50);
    assert_eq!(config.training.hidden_sizes, vec![512, 256]);
    assert!(!config.training.resume);
}

#[test]
fn test_evaluation_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.evaluation.games, 100);
    assert_eq!(config.evaluation.num_simulations, 128);
    assert!((config.evaluation.c_puct - 1.0).abs() < f64::EPSILON);
    assert_eq!(config.evaluation.classic_simulations, 250);
}

#[test]
fn test_mcts_defaults() {
    let config = CentralConfig::default();
    assert!((config.mcts.c_puct - 1.5).abs() < f64::EPSILON);
    assert!((config.mcts.temperature - 1.0).abs() < f64::EPSILON);
    assert_eq!(config.mcts.temp_threshold, 0);
    assert!(config.mcts.late_temperature.abs() < f64::EPSILON);
    assert!((config.mcts.dirichlet_alpha - 0.3).abs() < f64::EPSILON);
    assert!((config.mcts.dirichlet_weight - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_tinyzero_env_overrides() {
    std::env::set_var("TINYZERO_COMMON_ENV_ID", "pylos");
    std::env::set_var("TINYZERO_TRAINING_EPOCHS", "7");
    std::env::set_var("TINYZERO_TRAINING_WEIGHT_DECAY", "0.5");
    std::env::set_var("TINYZERO_TRAINING_HIDDEN_SIZES", "64, 32");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.common.env_id, "pylos");
    assert_eq!(config.training.epochs, 7);
    assert!((config.training.weight_decay - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.training.hidden_sizes, vec![64, 32]);

    std::env::remove_var("TINYZERO_COMMON_ENV_ID");
    std::env::remove_var("TINYZERO_TRAINING_EPOCHS");
    std::env::remove_var("TINYZERO_TRAINING_WEIGHT_DECAY");
    std::env::remove_var("TINYZERO_TRAINING_HIDDEN_SIZES");
}

#[test]
fn test_invalid_env_values_are_ignored() {
    std::env::set_var("TINYZERO_EVALUATION_GAMES", "lots");
    std::env::set_var("TINYZERO_EVALUATION_CLASSIC_SIMULATIONS", "300");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.evaluation.games, 100);
    assert_eq!(config.evaluation.classic_simulations, 300);

    std::env::remove_var("TINYZERO_EVALUATION_GAMES");
    std::env::remove_var("TINYZERO_EVALUATION_CLASSIC_SIMULATIONS");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
env_id = "pylos"
data_dir = "/custom/data"

[mcts]
num_simulations = 200
temp_threshold = 12

[training]
selfplay_games = 50
batch_size = 32
hidden_sizes = [128]
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.env_id, "pylos");
    assert_eq!(config.common.data_dir, "/custom/data");
    assert_eq!(config.mcts.num_simulations, 200);
    assert_eq!(config.mcts.temp_threshold, 12);
    assert_eq!(config.training.selfplay_games, 50);
    assert_eq!(config.training.batch_size, 32);
    assert_eq!(config.training.hidden_sizes, vec![128]);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[common]
env_id = "pylos"
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.env_id, "pylos");
    assert_eq!(config.common.data_dir, "./data"); // Default
    assert_eq!(config.training.replay_capacity, 512); // Default
    assert_eq!(config.evaluation.games, 100); // Default
}

#[test]
fn test_load_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[evaluation]\ngames = 12\nc_puct = 2.0").unwrap();

    let config = load_from_path(&file.path().to_path_buf());
    assert_eq!(config.evaluation.games, 12);
    assert!((config.evaluation.c_puct - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.evaluation.num_simulations, 128);
}

#[test]
fn test_load_from_invalid_path_falls_back() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "this is not [valid toml").unwrap();
    let config = load_from_path(&file.path().to_path_buf());
    assert_eq!(config.training.batch_size, 128);

    let missing = std::path::PathBuf::from("/nonexistent/tinyzero/config.toml");
    let config = load_from_path(&missing);
    assert_eq!(config.common.data_dir, "./data");
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.common.env_id, cloned.common.env_id);
    assert_eq!(config.training.hidden_sizes, cloned.training.hidden_sizes);
}
