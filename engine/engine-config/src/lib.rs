//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic used by
//! the trainer binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`TINYZERO_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml)
//!
//! Command-line flags of the trainer override all of these.
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! TINYZERO_<SECTION>_<KEY>=value
//!
//! Examples:
//!     TINYZERO_COMMON_ENV_ID=pylos
//!     TINYZERO_COMMON_DATA_DIR=/data
//!     TINYZERO_MCTS_NUM_SIMULATIONS=200
//!     TINYZERO_TRAINING_HIDDEN_SIZES=256,128
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;

#[cfg(test)]
mod tests;
