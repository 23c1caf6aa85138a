//! The value/policy oracle contract.
//!
//! An oracle maps an observation to a value estimate for the player to move
//! and a probability distribution over the whole action space. It is also
//! the thing training improves: `update` consumes a batch of self-play
//! samples and returns the losses, `save`/`load` persist the full trainable
//! state.

use std::path::Path;

use thiserror::Error;

/// Errors raised by oracle implementations.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("observation has {actual} values, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid training batch: {0}")]
    InvalidBatch(String),

    #[error("update failed: {0}")]
    UpdateFailed(String),

    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint serialization failed: {0}")]
    Serialization(String),
}

/// Output of a single oracle evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    /// Value estimate for the player to move, in [-1, 1].
    pub value: f32,

    /// Probabilities over the full action space. May put mass on illegal
    /// actions; callers mask.
    pub policy: Vec<f32>,
}

/// One training example produced by self-play.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    /// Observation from the perspective of the player to move.
    pub observation: Vec<f32>,

    /// Search visit distribution over the action space.
    pub policy: Vec<f32>,

    /// Final game result from the perspective of the player to move.
    pub value: f32,
}

/// Losses reported by one `Oracle::update` call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateLoss {
    pub value_loss: f32,
    pub policy_loss: f32,
}

impl UpdateLoss {
    /// Combined loss used for checkpoint decisions.
    pub fn total(&self) -> f32 {
        self.value_loss + self.policy_loss
    }
}

/// A learned (or fixed) evaluator of game positions.
pub trait Oracle {
    /// Evaluate one observation. Must not change the oracle.
    fn evaluate(&self, observation: &[f32]) -> Result<EvalResult, OracleError>;

    /// Value-only evaluation. Implementations with a cheaper value path can
    /// override this.
    fn value(&self, observation: &[f32]) -> Result<f32, OracleError> {
        Ok(self.evaluate(observation)?.value)
    }

    /// Train on one batch and return its losses.
    fn update(&mut self, batch: &[TrainingSample]) -> Result<UpdateLoss, OracleError>;

    /// Average combined loss of one training game. Learning-rate schedules
    /// hook in here; the default ignores it.
    fn observe_game_loss(&mut self, _average_loss: f32) {}

    /// Persist the trainable state into `dir`.
    fn save(&self, dir: &Path) -> Result<(), OracleError>;

    /// Restore state previously written by `save`.
    fn load(&mut self, dir: &Path) -> Result<(), OracleError>;
}

/// Oracle with a uniform policy and a neutral value that never learns.
///
/// Stands in for an untrained model and keeps search tests deterministic.
#[derive(Debug, Clone)]
pub struct UniformOracle {
    num_actions: usize,
}

impl UniformOracle {
    pub fn new(num_actions: usize) -> Self {
        Self { num_actions }
    }
}

impl Oracle for UniformOracle {
    fn evaluate(&self, _observation: &[f32]) -> Result<EvalResult, OracleError> {
        let p = if self.num_actions == 0 {
            0.0
        } else {
            1.0 / self.num_actions as f32
        };
        Ok(EvalResult {
            value: 0.0,
            policy: vec![p; self.num_actions],
        })
    }

    fn update(&mut self, _batch: &[TrainingSample]) -> Result<UpdateLoss, OracleError> {
        Ok(UpdateLoss::default())
    }

    fn save(&self, _dir: &Path) -> Result<(), OracleError> {
        Ok(())
    }

    fn load(&mut self, _dir: &Path) -> Result<(), OracleError> {
        Ok(())
    }
}
