//! Model: an ordered stack of dense layers with a compiled loss and
//! optimizer
//!
//! Forward chains each layer's forward in insertion order; backward chains
//! the backwards in reverse, feeding each layer's returned input-gradient
//! to the layer before it. Inference needs only the layer stack; training
//! additionally requires [`Model::compile`] to bind a loss and an
//! optimizer.

use log::info;

use crate::error::NetError;
use crate::layers::DenseLayer;
use crate::losses::{Loss, LossKind, Target};
use crate::optimizers::Optimizer;
use crate::tensor::Tensor;

/// Feed-forward network: layers in insertion order plus an optional
/// compiled loss/optimizer pair.
///
/// # Example
///
/// ```
/// use dnn_engine::{ActivationKind, DenseLayer, Loss, LossKind, Model, Sgd, Tensor};
/// use dnn_engine::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let mut model = Model::new();
/// model.add(DenseLayer::new(2, 3, ActivationKind::Relu, &mut rng));
/// model.add(DenseLayer::new(3, 2, ActivationKind::Softmax, &mut rng));
/// model
///     .compile(
///         Loss::new(LossKind::SparseCategoricalCrossEntropy, 2),
///         Box::new(Sgd::new(0.1)),
///     )
///     .unwrap();
///
/// let x = Tensor::from_vec(1, 2, vec![1.0, -1.0]);
/// let loss = model.train_step(&x, &[0]).unwrap();
/// assert!(loss.is_finite());
/// ```
#[derive(Default)]
pub struct Model {
    layers: Vec<DenseLayer>,
    loss: Option<Loss>,
    optimizer: Option<Box<dyn Optimizer>>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            loss: None,
            optimizer: None,
        }
    }

    /// Append a layer to the end of the pipeline.
    pub fn add(&mut self, layer: DenseLayer) {
        self.layers.push(layer);
    }

    /// Number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Borrow layer `i`.
    pub fn layer(&self, i: usize) -> &DenseLayer {
        &self.layers[i]
    }

    /// Mutably borrow layer `i`, e.g. for loading external weights.
    pub fn layer_mut(&mut self, i: usize) -> &mut DenseLayer {
        &mut self.layers[i]
    }

    /// Total trainable parameters across all layers.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(DenseLayer::parameter_count).sum()
    }

    /// Bind a loss and an optimizer, enabling training.
    ///
    /// Rejects an empty model, and rejects loss/activation pairings whose
    /// combined gradient would be silently wrong: the categorical losses
    /// require a softmax final layer (their backward assumes the softmax
    /// identity pass-through) and binary cross-entropy requires a sigmoid
    /// output. The final layer's width must also fit the loss: binary
    /// cross-entropy reads a single probability per row, and the
    /// categorical losses expect one column per class.
    pub fn compile(&mut self, loss: Loss, optimizer: Box<dyn Optimizer>) -> Result<(), NetError> {
        let last = self
            .layers
            .last()
            .ok_or_else(|| NetError::InvalidConfig("model has no layers".to_string()))?;

        if let Some(required) = loss.required_activation() {
            let found = last.activation_kind();
            if found != required {
                return Err(NetError::LossActivationMismatch {
                    loss: loss.kind().name(),
                    required: required.name(),
                    found: found.name(),
                });
            }
        }

        let width = last.output_size();
        match loss.kind() {
            LossKind::BinaryCrossEntropy => {
                if width != 1 {
                    return Err(NetError::OutputWidthMismatch {
                        loss: loss.kind().name(),
                        expected: 1,
                        found: width,
                    });
                }
            }
            LossKind::CategoricalCrossEntropy | LossKind::SparseCategoricalCrossEntropy => {
                if loss.num_classes() > 0 && width != loss.num_classes() {
                    return Err(NetError::OutputWidthMismatch {
                        loss: loss.kind().name(),
                        expected: loss.num_classes(),
                        found: width,
                    });
                }
            }
            LossKind::MeanSquaredError => {}
        }

        self.loss = Some(loss);
        self.optimizer = Some(optimizer);
        Ok(())
    }

    /// Forward pass: chain each layer's forward in insertion order.
    pub fn forward(&mut self, input: &Tensor) -> Tensor {
        let mut x = input.clone();
        for layer in &mut self.layers {
            x = layer.forward(&x);
        }
        x
    }

    /// Inference alias for [`Model::forward`].
    pub fn predict(&mut self, input: &Tensor) -> Tensor {
        self.forward(input)
    }

    /// Backward pass: chain each layer's backward in reverse order and
    /// return the gradient w.r.t. the model input.
    pub fn backward(&mut self, grad_output: &Tensor) -> Tensor {
        let mut grad = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad);
        }
        grad
    }

    /// One full training step for a single sparse-labeled example (or
    /// batch): forward, loss, backward, one optimizer step per parameter
    /// pair per layer. Returns the pre-update loss for reporting.
    pub fn train_step(&mut self, input: &Tensor, labels: &[usize]) -> Result<f32, NetError> {
        self.train_step_with(input, Target::Classes(labels))
    }

    /// [`Model::train_step`] for an arbitrary target variant (dense targets
    /// for MSE/BCE/categorical cross-entropy).
    pub fn train_step_with(&mut self, input: &Tensor, target: Target<'_>) -> Result<f32, NetError> {
        let loss = self.loss.clone().ok_or(NetError::NotCompiled)?;
        if self.optimizer.is_none() {
            return Err(NetError::NotCompiled);
        }

        let output = self.forward(input);
        let loss_value = loss.forward(&output, target)?;
        let grad = loss.backward(&output, target)?;
        self.backward(&grad);

        if let Some(optimizer) = self.optimizer.as_mut() {
            for layer in &mut self.layers {
                layer.apply_gradients(optimizer.as_mut());
            }
        }

        Ok(loss_value)
    }

    /// Train on sparse-labeled examples for `epochs` passes, one training
    /// step per example, logging epoch loss and argmax accuracy.
    pub fn fit(
        &mut self,
        inputs: &[Tensor],
        labels: &[usize],
        epochs: usize,
    ) -> Result<(), NetError> {
        assert_eq!(
            inputs.len(),
            labels.len(),
            "Expected one label per training example"
        );
        let loss = self.loss.clone().ok_or(NetError::NotCompiled)?;
        if self.optimizer.is_none() {
            return Err(NetError::NotCompiled);
        }

        for epoch in 0..epochs {
            let mut epoch_loss = 0.0f32;
            let mut correct = 0usize;

            for (input, &label) in inputs.iter().zip(labels) {
                let output = self.forward(input);
                // Accuracy bookkeeping is reporting only, outside the
                // gradient path.
                if output.argmax() == label {
                    correct += 1;
                }

                let target = Target::Classes(std::slice::from_ref(&label));
                epoch_loss += loss.forward(&output, target)?;
                let grad = loss.backward(&output, target)?;
                self.backward(&grad);

                if let Some(optimizer) = self.optimizer.as_mut() {
                    for layer in &mut self.layers {
                        layer.apply_gradients(optimizer.as_mut());
                    }
                }
            }

            info!(
                "epoch {} | loss: {:.6} | accuracy: {:.4}",
                epoch + 1,
                epoch_loss / inputs.len() as f32,
                correct as f32 / inputs.len() as f32
            );
        }
        Ok(())
    }

    /// Mean loss and argmax accuracy over sparse-labeled examples, without
    /// updating any parameters.
    pub fn evaluate(&mut self, inputs: &[Tensor], labels: &[usize]) -> Result<(f32, f32), NetError> {
        assert_eq!(
            inputs.len(),
            labels.len(),
            "Expected one label per evaluation example"
        );
        let loss = self.loss.clone().ok_or(NetError::NotCompiled)?;

        let mut total_loss = 0.0f32;
        let mut correct = 0usize;
        for (input, &label) in inputs.iter().zip(labels) {
            let output = self.forward(input);
            total_loss += loss.forward(&output, Target::Classes(std::slice::from_ref(&label)))?;
            if output.argmax() == label {
                correct += 1;
            }
        }

        let mean_loss = total_loss / inputs.len() as f32;
        let accuracy = correct as f32 / inputs.len() as f32;
        info!("evaluation | loss: {:.6} | accuracy: {:.4}", mean_loss, accuracy);
        Ok((mean_loss, accuracy))
    }
}
