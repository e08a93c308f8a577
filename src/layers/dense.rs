//! Dense (fully connected) layer
//!
//! Forward:  `y = activation(x · W + b)`
//! Backward: `grad_W = xᵀ · d`, `grad_b = column sums of d`, `dx = d · Wᵀ`
//! where `d` is the upstream gradient passed through the activation's
//! backward.

use crate::activations::{Activation, ActivationKind};
use crate::optimizers::{Optimizer, ParamId};
use crate::tensor::Tensor;
use crate::utils::SimpleRng;

/// Dense layer with weights, biases and an embedded activation.
///
/// Owns the canonical parameter storage: `weights` is an
/// `input_size × output_size` tensor, `biases` a vector of length
/// `output_size`. Each backward call overwrites `grad_weights`/`grad_biases`
/// with the gradient of that call's batch; there is no accumulation across
/// calls.
///
/// Both parameter buffers carry a stable [`ParamId`] minted at
/// construction; optimizers key their per-parameter state on it and mutate
/// the layer's storage directly through [`DenseLayer::apply_gradients`].
///
/// # Example
///
/// ```
/// use dnn_engine::{ActivationKind, DenseLayer, Tensor};
/// use dnn_engine::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let mut layer = DenseLayer::new(784, 512, ActivationKind::Relu, &mut rng);
/// assert_eq!(layer.parameter_count(), 784 * 512 + 512);
///
/// let out = layer.forward(&Tensor::new(1, 784));
/// assert_eq!(out.cols(), 512);
/// ```
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    weights: Tensor,
    biases: Vec<f32>,
    grad_weights: Tensor,
    grad_biases: Vec<f32>,
    weight_id: ParamId,
    bias_id: ParamId,
    activation: Activation,
    input_cache: Tensor,
}

impl DenseLayer {
    /// Create a dense layer with Xavier/Glorot-initialized weights and zero
    /// biases.
    ///
    /// Weights are sampled uniformly from `[-limit, limit]` with
    /// `limit = sqrt(6 / (input_size + output_size))`, so a fixed RNG seed
    /// yields a reproducible network.
    pub fn new(
        input_size: usize,
        output_size: usize,
        kind: ActivationKind,
        rng: &mut SimpleRng,
    ) -> Self {
        Self::with_activation(input_size, output_size, Activation::new(kind), rng)
    }

    /// Create a dense layer with an explicitly configured activation
    /// (custom `alpha`/`beta` hyperparameters).
    pub fn with_activation(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut SimpleRng,
    ) -> Self {
        let mut weights = Tensor::new(input_size, output_size);
        let limit = (6.0f32 / (input_size + output_size) as f32).sqrt();
        for value in weights.data_mut() {
            *value = rng.gen_range_f32(-limit, limit);
        }

        Self {
            input_size,
            output_size,
            weights,
            biases: vec![0.0; output_size],
            grad_weights: Tensor::new(input_size, output_size),
            grad_biases: vec![0.0; output_size],
            weight_id: ParamId::fresh(),
            bias_id: ParamId::fresh(),
            activation,
            input_cache: Tensor::default(),
        }
    }

    /// Forward pass over a `batch_size × input_size` tensor.
    ///
    /// Caches the input for the backward pass and returns the activated
    /// `batch_size × output_size` output.
    ///
    /// # Panics
    ///
    /// Panics if `x.cols() != input_size`.
    pub fn forward(&mut self, x: &Tensor) -> Tensor {
        assert_eq!(
            x.cols(),
            self.input_size,
            "Layer input width {} does not match input_size {}",
            x.cols(),
            self.input_size
        );

        self.input_cache = x.clone();

        let mut out = x.matmul(&self.weights);
        out.add_bias(&self.biases);
        self.activation.forward(&out)
    }

    /// Backward pass given the gradient w.r.t. this layer's output.
    ///
    /// Overwrites the weight and bias gradients and returns the gradient
    /// w.r.t. the layer's input, for the preceding layer.
    ///
    /// # Panics
    ///
    /// Panics if `dout`'s width differs from `output_size` or its row count
    /// differs from the cached forward input's.
    pub fn backward(&mut self, dout: &Tensor) -> Tensor {
        assert_eq!(
            dout.cols(),
            self.output_size,
            "Gradient width {} does not match output_size {}",
            dout.cols(),
            self.output_size
        );
        assert_eq!(
            dout.rows(),
            self.input_cache.rows(),
            "Gradient batch size {} does not match cached input batch size {}",
            dout.rows(),
            self.input_cache.rows()
        );

        let dout_act = self.activation.backward(dout);

        self.grad_weights = self.input_cache.transpose().matmul(&dout_act);

        self.grad_biases.fill(0.0);
        for i in 0..dout_act.rows() {
            for j in 0..dout_act.cols() {
                self.grad_biases[j] += dout_act[(i, j)];
            }
        }

        dout_act.matmul(&self.weights.transpose())
    }

    /// Run one optimizer step on this layer's weights and biases.
    ///
    /// The optimizer mutates the canonical storage in place; per-parameter
    /// state is keyed by the layer's stable parameter ids.
    pub fn apply_gradients(&mut self, optimizer: &mut dyn Optimizer) {
        optimizer.step(
            self.weight_id,
            self.weights.data_mut(),
            self.grad_weights.data(),
        );
        optimizer.step(self.bias_id, &mut self.biases, &self.grad_biases);
    }

    /// Number of input features.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of output features.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Total trainable parameters (weights plus biases).
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Kind of the embedded activation.
    pub fn activation_kind(&self) -> ActivationKind {
        self.activation.kind()
    }

    /// Weight matrix (`input_size × output_size`).
    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    /// Bias vector.
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    /// Gradient of the most recent backward pass w.r.t. the weights.
    pub fn grad_weights(&self) -> &Tensor {
        &self.grad_weights
    }

    /// Gradient of the most recent backward pass w.r.t. the biases.
    pub fn grad_biases(&self) -> &[f32] {
        &self.grad_biases
    }

    /// Replace the weight buffer, e.g. with values loaded from a raw
    /// weight file.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != input_size * output_size`.
    pub fn set_weights(&mut self, data: Vec<f32>) {
        self.weights = Tensor::from_vec(self.input_size, self.output_size, data);
    }

    /// Replace the bias buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != output_size`.
    pub fn set_biases(&mut self, data: Vec<f32>) {
        assert_eq!(
            data.len(),
            self.output_size,
            "Bias length {} does not match output_size {}",
            data.len(),
            self.output_size
        );
        self.biases = data;
    }
}
