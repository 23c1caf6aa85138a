//! AdamW optimizer (Adam with decoupled weight decay)
//!
//! AdamW: θ_t = (1 - lr * λ) * θ_{t-1} - lr_t * m_t / (√v_t + ε)
//! with the bias correction folded into `lr_t`.

use mcts::OracleError;
use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Zip};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamW {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<ArrayD<f32>>, // First moment
    v: Vec<ArrayD<f32>>, // Second moment
}

impl AdamW {
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32, weight_decay: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            weight_decay,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Betas (0.9, 0.999) and ε = 1e-8.
    pub fn with_weight_decay(lr: f32, weight_decay: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8, weight_decay)
    }

    pub fn lr(&self) -> f32 {
        self.lr
    }

    pub fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    pub fn step_count(&self) -> u64 {
        self.t
    }

    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    /// Apply one update. `params` and `grads` must line up tensor by tensor.
    pub fn step(
        &mut self,
        params: Vec<ArrayViewMutD<'_, f32>>,
        grads: Vec<ArrayViewD<'_, f32>>,
    ) -> Result<(), OracleError> {
        if params.len() != grads.len() {
            return Err(OracleError::UpdateFailed(format!(
                "{} parameter tensors but {} gradients",
                params.len(),
                grads.len()
            )));
        }
        for (i, (param, grad)) in params.iter().zip(&grads).enumerate() {
            if param.shape() != grad.shape() {
                return Err(OracleError::UpdateFailed(format!(
                    "shape mismatch in tensor {i}: param {:?}, grad {:?}",
                    param.shape(),
                    grad.shape()
                )));
            }
        }
        if self.m.is_empty() {
            self.m = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.v = self.m.clone();
        }
        if self.m.len() != params.len() {
            return Err(OracleError::UpdateFailed(format!(
                "optimizer tracks {} tensors, network has {}",
                self.m.len(),
                params.len()
            )));
        }
        for (i, (m, grad)) in self.m.iter().zip(&grads).enumerate() {
            if m.shape() != grad.shape() {
                return Err(OracleError::UpdateFailed(format!(
                    "shape mismatch in tensor {i}: grad {:?}, moment {:?}",
                    grad.shape(),
                    m.shape()
                )));
            }
        }

        // Nothing below can fail; all tensors are stepped or none are.
        self.t += 1;
        let t = self.t.min(i32::MAX as u64) as i32;
        let lr_t = self.lr * ((1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t)));
        let decay = 1.0 - self.lr * self.weight_decay;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        let tensors = params.into_iter().zip(grads).zip(self.m.iter_mut().zip(&mut self.v));
        for ((mut param, grad), (m, v)) in tensors {
            Zip::from(&mut param)
                .and(&grad)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    *p = *p * decay - lr_t * *m / (v.sqrt() + epsilon);
                });
        }
        Ok(())
    }
}
