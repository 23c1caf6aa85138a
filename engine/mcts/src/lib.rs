//! Game-agnostic Monte Carlo Tree Search for AlphaZero-style play.
//!
//! The search drives one live [`engine_core::Game`] with `step` and
//! `undo_last_action`; it never clones game state.
//!
//! # Overview
//!
//! Each simulation runs four phases:
//!
//! 1. **Selection**: descend from the root by PUCT until a leaf
//! 2. **Expansion**: create one child per legal action, priors from the
//!    evaluator, each child seeded with one value evaluation
//! 3. **Evaluation**: terminal result or evaluator value at the leaf
//! 4. **Backpropagation**: update visit counts and values on the path,
//!    flipping the sign at every ply
//!
//! # Usage
//!
//! ```rust,ignore
//! use games_connect4::Connect4;
//! use mcts::{run_mcts, select_action, MctsConfig, RolloutEvaluator, SelectionMode};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut game = Connect4::new();
//! let evaluator = RolloutEvaluator::new();
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//!
//! let result = run_mcts(&mut game, &evaluator, MctsConfig::for_evaluation(), &mut rng)?;
//! let action = select_action(&result.visit_counts, SelectionMode::Greedy, &mut rng)?;
//! println!("Policy: {:?}, value: {}", result.policy, result.value);
//! ```
//!
//! # Evaluators
//!
//! - [`OracleEvaluator`]: asks an [`Oracle`] for prior and value
//! - [`RolloutEvaluator`]: uniform prior, random playout value ("classic MCTS")
//! - [`UniformEvaluator`]: uniform prior, zero value (for testing)

pub mod config;
pub mod evaluator;
pub mod node;
pub mod oracle;
pub mod search;
pub mod selector;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use evaluator::{
    Evaluator, EvaluatorError, OracleEvaluator, RolloutEvaluator, UniformEvaluator,
};
pub use node::{MctsNode, NodeId};
pub use oracle::{EvalResult, Oracle, OracleError, TrainingSample, UniformOracle, UpdateLoss};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult, SearchStats};
pub use selector::{
    select_action, select_from_result, visit_distribution, SelectionMode, TemperatureSchedule,
};
pub use tree::{MctsTree, TreeStats};
