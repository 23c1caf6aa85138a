//! Learned value/policy oracle.
//!
//! A fully-connected network (two ReLU hidden layers of 512 and 256 units by
//! default) with a tanh value head and a softmax policy head. Training
//! minimizes `MSE(value) + cross_entropy(policy)` with AdamW; the learning
//! rate drops on loss plateaus.
//!
//! # Checkpoints
//!
//! [`Oracle::save`] writes three files into a directory:
//!
//! - `model.json`: network weights
//! - `optimizer.json`: AdamW moments and step count
//! - `lr_scheduler.json`: plateau scheduler state
//!
//! Only `model.json` is required by [`Oracle::load`].

pub mod adamw;
pub mod checkpoint;
pub mod network;
pub mod scheduler;

use std::io;
use std::path::Path;

use mcts::{EvalResult, Oracle, OracleError, TrainingSample, UpdateLoss};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info, warn};

pub use adamw::AdamW;
pub use checkpoint::{MODEL_FILE, OPTIMIZER_FILE, SCHEDULER_FILE};
pub use network::LinearNetwork;
pub use scheduler::ReduceLrOnPlateau;

/// Hyperparameters of a [`LinearOracle`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearOracleConfig {
    pub hidden_sizes: Vec<usize>,
    pub learning_rate: f32,
    pub weight_decay: f32,
    /// Plateau scheduler multiplier
    pub lr_factor: f32,
    /// Plateau scheduler patience, in training games
    pub lr_patience: u32,
    /// Seed for weight initialization
    pub seed: u64,
}

impl Default for LinearOracleConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![512, 256],
            learning_rate: 1e-3,
            weight_decay: 1e-4,
            lr_factor: 0.1,
            lr_patience: 50,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinearOracle {
    network: LinearNetwork,
    optimizer: AdamW,
    scheduler: ReduceLrOnPlateau,
}

impl LinearOracle {
    pub fn new(input_size: usize, num_actions: usize, config: &LinearOracleConfig) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
        let network = LinearNetwork::new(input_size, &config.hidden_sizes, num_actions, &mut rng);
        debug!(
            input_size,
            num_actions,
            parameters = network.num_parameters(),
            "Created linear oracle"
        );
        Self {
            network,
            optimizer: AdamW::with_weight_decay(config.learning_rate, config.weight_decay),
            scheduler: ReduceLrOnPlateau::new(
                config.learning_rate,
                config.lr_factor,
                config.lr_patience,
            ),
        }
    }

    pub fn network(&self) -> &LinearNetwork {
        &self.network
    }

    pub fn learning_rate(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Number of optimizer steps taken so far.
    pub fn update_count(&self) -> u64 {
        self.optimizer.step_count()
    }

    fn check_observation(&self, len: usize) -> Result<(), OracleError> {
        let expected = self.network.input_size();
        if len != expected {
            return Err(OracleError::ShapeMismatch {
                expected,
                actual: len,
            });
        }
        Ok(())
    }

    /// Stack a batch into (observations, target policies, target values).
    fn stack_batch(
        &self,
        batch: &[TrainingSample],
    ) -> Result<(Array2<f32>, Array2<f32>, Array1<f32>), OracleError> {
        if batch.is_empty() {
            return Err(OracleError::InvalidBatch("empty batch".into()));
        }
        let input_size = self.network.input_size();
        let num_actions = self.network.num_actions();

        let mut observations = Vec::with_capacity(batch.len() * input_size);
        let mut policies = Vec::with_capacity(batch.len() * num_actions);
        let mut values = Vec::with_capacity(batch.len());
        for (i, sample) in batch.iter().enumerate() {
            self.check_observation(sample.observation.len())?;
            if sample.policy.len() != num_actions {
                return Err(OracleError::InvalidBatch(format!(
                    "sample {i} has a policy of length {}, expected {num_actions}",
                    sample.policy.len()
                )));
            }
            observations.extend_from_slice(&sample.observation);
            policies.extend_from_slice(&sample.policy);
            values.push(sample.value);
        }

        let to_batch_err = |e: ndarray::ShapeError| OracleError::InvalidBatch(e.to_string());
        Ok((
            Array2::from_shape_vec((batch.len(), input_size), observations)
                .map_err(to_batch_err)?,
            Array2::from_shape_vec((batch.len(), num_actions), policies).map_err(to_batch_err)?,
            Array1::from(values),
        ))
    }
}

impl Oracle for LinearOracle {
    fn evaluate(&self, observation: &[f32]) -> Result<EvalResult, OracleError> {
        self.check_observation(observation.len())?;
        let x = Array2::from_shape_vec((1, observation.len()), observation.to_vec())
            .map_err(|e| OracleError::InvalidBatch(e.to_string()))?;

        let pass = self.network.forward(x);
        Ok(EvalResult {
            value: pass.value[0],
            policy: pass.log_policy.row(0).mapv(f32::exp).to_vec(),
        })
    }

    fn update(&mut self, batch: &[TrainingSample]) -> Result<UpdateLoss, OracleError> {
        let (x, target_policy, target_value) = self.stack_batch(batch)?;

        let pass = self.network.forward(x);
        let (grads, loss) = self.network.backward(&pass, &target_policy, &target_value);
        if !loss.total().is_finite() {
            return Err(OracleError::UpdateFailed(format!(
                "non-finite loss (value {}, policy {})",
                loss.value_loss, loss.policy_loss
            )));
        }

        self.optimizer.step(
            self.network.parameters_mut(),
            network::gradient_views(&grads),
        )?;
        Ok(loss)
    }

    fn observe_game_loss(&mut self, average_loss: f32) {
        let lr = self.scheduler.step(average_loss);
        self.optimizer.set_lr(lr);
    }

    fn save(&self, dir: &Path) -> Result<(), OracleError> {
        checkpoint::write_json(dir, MODEL_FILE, &self.network)?;
        checkpoint::write_json(dir, OPTIMIZER_FILE, &self.optimizer)?;
        checkpoint::write_json(dir, SCHEDULER_FILE, &self.scheduler)?;
        info!(
            dir = %dir.display(),
            updates = self.optimizer.step_count(),
            "Saved oracle checkpoint"
        );
        Ok(())
    }

    fn load(&mut self, dir: &Path) -> Result<(), OracleError> {
        let network: LinearNetwork =
            checkpoint::read_json(dir, MODEL_FILE)?.ok_or_else(|| {
                OracleError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found in {}", MODEL_FILE, dir.display()),
                ))
            })?;
        if network.num_actions() != self.network.num_actions() {
            return Err(OracleError::ShapeMismatch {
                expected: self.network.num_actions(),
                actual: network.num_actions(),
            });
        }
        self.check_observation(network.input_size())?;
        self.network = network;

        match checkpoint::read_json::<ReduceLrOnPlateau>(dir, SCHEDULER_FILE)? {
            Some(scheduler) => self.scheduler = scheduler,
            None => warn!(dir = %dir.display(), "No scheduler state in checkpoint, keeping current"),
        }

        match checkpoint::read_json::<AdamW>(dir, OPTIMIZER_FILE)? {
            Some(optimizer) => self.optimizer = optimizer,
            None => {
                warn!(dir = %dir.display(), "No optimizer state in checkpoint, starting fresh");
                self.optimizer =
                    AdamW::with_weight_decay(self.scheduler.lr(), self.optimizer.weight_decay());
            }
        }
        self.optimizer.set_lr(self.scheduler.lr());

        info!(
            dir = %dir.display(),
            hidden = ?self.network.hidden_sizes(),
            updates = self.optimizer.step_count(),
            "Loaded oracle checkpoint"
        );
        Ok(())
    }
}
