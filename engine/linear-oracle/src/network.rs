//! Fully-connected value/policy network.
//!
//! ```text
//! observation -> [Dense -> ReLU] x hidden -> +-> value head  -> tanh
//!                                            +-> policy head -> log_softmax
//! ```
//!
//! Forward and backward passes are batched: rows are samples.

use mcts::UpdateLoss;
use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD, Axis, Zip};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

/// One affine layer. `weight` is `(inputs, outputs)` so a batch is `x.dot(w) + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    pub weight: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Dense {
    /// Uniform init in `±1/sqrt(inputs)` for both weights and bias.
    pub fn new(inputs: usize, outputs: usize, rng: &mut ChaCha20Rng) -> Self {
        let bound = 1.0 / (inputs.max(1) as f32).sqrt();
        let dist = Uniform::new_inclusive(-bound, bound);
        Self {
            weight: Array2::from_shape_fn((inputs, outputs), |_| rng.sample(dist)),
            bias: Array1::from_shape_fn(outputs, |_| rng.sample(dist)),
        }
    }

    pub fn inputs(&self) -> usize {
        self.weight.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.weight.ncols()
    }

    fn apply(&self, x: &Array2<f32>) -> Array2<f32> {
        x.dot(&self.weight) + &self.bias
    }

    /// Parameter gradient given the layer input and the loss gradient at its output.
    fn gradient(input: &Array2<f32>, delta: &Array2<f32>) -> Self {
        Self {
            weight: input.t().dot(delta),
            bias: delta.sum_axis(Axis(0)),
        }
    }
}

/// Cached activations of one forward pass.
#[derive(Debug)]
pub struct ForwardPass {
    /// Input of every trunk layer followed by the trunk output.
    activations: Vec<Array2<f32>>,
    /// tanh value per row.
    pub value: Array1<f32>,
    /// Log-probabilities per row.
    pub log_policy: Array2<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearNetwork {
    trunk: Vec<Dense>,
    value_head: Dense,
    policy_head: Dense,
}

impl LinearNetwork {
    pub fn new(
        input_size: usize,
        hidden_sizes: &[usize],
        num_actions: usize,
        rng: &mut ChaCha20Rng,
    ) -> Self {
        let mut trunk = Vec::with_capacity(hidden_sizes.len());
        let mut width = input_size;
        for &size in hidden_sizes {
            trunk.push(Dense::new(width, size, rng));
            width = size;
        }
        Self {
            trunk,
            value_head: Dense::new(width, 1, rng),
            policy_head: Dense::new(width, num_actions, rng),
        }
    }

    pub fn input_size(&self) -> usize {
        self.trunk
            .first()
            .map_or_else(|| self.value_head.inputs(), Dense::inputs)
    }

    pub fn num_actions(&self) -> usize {
        self.policy_head.outputs()
    }

    pub fn hidden_sizes(&self) -> Vec<usize> {
        self.trunk.iter().map(Dense::outputs).collect()
    }

    /// Total number of trainable scalars.
    pub fn num_parameters(&self) -> usize {
        self.layers()
            .map(|layer| layer.weight.len() + layer.bias.len())
            .sum()
    }

    pub fn forward(&self, x: Array2<f32>) -> ForwardPass {
        let mut activations = Vec::with_capacity(self.trunk.len() + 1);
        let mut h = x;
        for layer in &self.trunk {
            let mut z = layer.apply(&h);
            z.mapv_inplace(|v| v.max(0.0));
            activations.push(std::mem::replace(&mut h, z));
        }

        let value = self.value_head.apply(&h).column(0).mapv(f32::tanh);
        let log_policy = log_softmax_rows(self.policy_head.apply(&h));
        activations.push(h);

        ForwardPass {
            activations,
            value,
            log_policy,
        }
    }

    /// Losses and parameter gradients for one batch.
    ///
    /// Loss is `mean((v - z)^2) - mean(sum(pi * log p))`. Gradients come
    /// back in the same order as [`LinearNetwork::parameters_mut`].
    pub fn backward(
        &self,
        pass: &ForwardPass,
        target_policy: &Array2<f32>,
        target_value: &Array1<f32>,
    ) -> (Vec<Dense>, UpdateLoss) {
        let batch = target_value.len().max(1) as f32;

        let diff = &pass.value - target_value;
        let value_loss = diff.mapv(|d| d * d).sum() / batch;
        let policy_loss = -(target_policy * &pass.log_policy).sum() / batch;

        // d/d(pre-tanh) of the squared error
        let tanh_grad = pass.value.mapv(|v| 1.0 - v * v);
        let d_value = ((diff * tanh_grad) * (2.0 / batch)).insert_axis(Axis(1));

        // d/d(logits) of the cross-entropy; targets need not be normalized
        let probs = pass.log_policy.mapv(f32::exp);
        let target_mass = target_policy.sum_axis(Axis(1)).insert_axis(Axis(1));
        let d_logits = (probs * &target_mass - target_policy) / batch;

        let trunk_out = &pass.activations[self.trunk.len()];
        let value_grad = Dense::gradient(trunk_out, &d_value);
        let policy_grad = Dense::gradient(trunk_out, &d_logits);

        let mut delta = d_value.dot(&self.value_head.weight.t())
            + d_logits.dot(&self.policy_head.weight.t());
        let mut grads = Vec::with_capacity(self.trunk.len() + 2);
        for (i, layer) in self.trunk.iter().enumerate().rev() {
            Zip::from(&mut delta)
                .and(&pass.activations[i + 1])
                .for_each(|d, &out| {
                    if out <= 0.0 {
                        *d = 0.0;
                    }
                });
            grads.push(Dense::gradient(&pass.activations[i], &delta));
            delta = delta.dot(&layer.weight.t());
        }
        grads.reverse();
        grads.push(value_grad);
        grads.push(policy_grad);

        (
            grads,
            UpdateLoss {
                value_loss,
                policy_loss,
            },
        )
    }

    /// Mutable views of every parameter tensor: trunk layers, value head, policy head.
    pub fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        let layers = self
            .trunk
            .iter_mut()
            .chain(std::iter::once(&mut self.value_head))
            .chain(std::iter::once(&mut self.policy_head));

        let mut views = Vec::new();
        for Dense { weight, bias } in layers {
            views.push(weight.view_mut().into_dyn());
            views.push(bias.view_mut().into_dyn());
        }
        views
    }

    fn layers(&self) -> impl Iterator<Item = &Dense> {
        self.trunk
            .iter()
            .chain(std::iter::once(&self.value_head))
            .chain(std::iter::once(&self.policy_head))
    }
}

/// Flatten layer gradients to match [`LinearNetwork::parameters_mut`].
pub fn gradient_views(grads: &[Dense]) -> Vec<ArrayViewD<'_, f32>> {
    grads
        .iter()
        .flat_map(|g| [g.weight.view().into_dyn(), g.bias.view().into_dyn()])
        .collect()
}

fn log_softmax_rows(mut logits: Array2<f32>) -> Array2<f32> {
    for mut row in logits.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let log_sum = row.mapv(|v| (v - max).exp()).sum().ln();
        row.mapv_inplace(|v| v - max - log_sum);
    }
    logits
}
