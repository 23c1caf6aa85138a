//! Reduce-on-plateau learning rate scheduler
//!
//! Multiplies the learning rate by `factor` once the monitored loss has
//! failed to improve for more than `patience` consecutive steps.
//! Improvement means `loss < best * (1 - threshold)`.

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceLrOnPlateau {
    lr: f32,
    factor: f32,
    patience: u32,
    threshold: f32,
    min_lr: f32,
    /// None until the first finite loss; serde_json cannot encode infinity.
    best: Option<f32>,
    num_bad_steps: u32,
}

impl ReduceLrOnPlateau {
    pub fn new(lr: f32, factor: f32, patience: u32) -> Self {
        Self {
            lr,
            factor,
            patience,
            threshold: 1e-4,
            min_lr: 0.0,
            best: None,
            num_bad_steps: 0,
        }
    }

    pub fn with_min_lr(mut self, min_lr: f32) -> Self {
        self.min_lr = min_lr;
        self
    }

    /// Current learning rate
    pub fn lr(&self) -> f32 {
        self.lr
    }

    pub fn best(&self) -> Option<f32> {
        self.best
    }

    /// Record one loss observation and return the learning rate to use next.
    /// Non-finite losses count as no improvement.
    pub fn step(&mut self, loss: f32) -> f32 {
        let improved = self
            .best
            .map_or(true, |best| loss < best * (1.0 - self.threshold));
        if loss.is_finite() && improved {
            self.best = Some(loss);
            self.num_bad_steps = 0;
        } else {
            self.num_bad_steps += 1;
        }

        if self.num_bad_steps > self.patience {
            let reduced = (self.lr * self.factor).max(self.min_lr);
            if self.lr - reduced > 1e-8 {
                info!(old_lr = self.lr, new_lr = reduced, "Reducing learning rate");
                self.lr = reduced;
            }
            self.num_bad_steps = 0;
        }
        self.lr
    }
}
