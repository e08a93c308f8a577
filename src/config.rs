//! JSON configuration for network architecture and training
//!
//! Enables architecture and hyperparameter experimentation without code
//! changes. A network config is a sequence of dense-layer descriptions; a
//! training config selects the loss and optimizer and their
//! hyperparameters.
//!
//! # Examples
//!
//! ```json
//! {
//!   "layers": [
//!     { "input_size": 80, "output_size": 256, "activation": "relu" },
//!     { "input_size": 256, "output_size": 10, "activation": "softmax" }
//!   ]
//! }
//! ```
//!
//! ```json
//! {
//!   "loss": "sparse_categorical_cross_entropy",
//!   "num_classes": 10,
//!   "optimizer": "sgd",
//!   "learning_rate": 0.01,
//!   "momentum": 0.9,
//!   "epochs": 10
//! }
//! ```

use serde::Deserialize;
use std::error::Error;
use std::fs;

use crate::activations::{Activation, ActivationKind};
use crate::error::NetError;
use crate::layers::DenseLayer;
use crate::losses::{Loss, LossKind};
use crate::model::Model;
use crate::optimizers::{Adam, Optimizer, RmsProp, Sgd};
use crate::tensor::Tensor;
use crate::utils::SimpleRng;

/// Configuration for a single dense layer.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    /// Number of input features
    pub input_size: usize,
    /// Number of output features
    pub output_size: usize,
    /// Activation name: "relu", "sigmoid", "softmax", ...
    pub activation: String,
    /// Alpha for the leaky_relu/prelu/elu family (default 0.01)
    pub alpha: Option<f32>,
    /// Beta for swish (default 1.0)
    pub beta: Option<f32>,
}

/// Configuration for the whole network: layers applied in order.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub layers: Vec<LayerConfig>,
}

/// Training configuration: loss, optimizer and hyperparameters.
///
/// Different optimizers read different optional fields:
///
/// - **sgd**: optional `momentum` (default 0.0)
/// - **rmsprop**: optional `beta` (default 0.9), `epsilon` (default 1e-8)
/// - **adam**: optional `beta1` (0.9), `beta2` (0.999), `epsilon` (1e-8)
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Loss name: "mse", "binary_cross_entropy",
    /// "categorical_cross_entropy", or "sparse_categorical_cross_entropy"
    pub loss: String,
    /// Class count for the categorical losses
    pub num_classes: Option<usize>,
    /// Optimizer name: "sgd", "rmsprop", or "adam"
    pub optimizer: String,
    /// Step size for parameter updates
    pub learning_rate: f32,
    /// Momentum factor for SGD
    pub momentum: Option<f32>,
    /// Squared-gradient decay for RMSProp
    pub beta: Option<f32>,
    /// First-moment decay for Adam
    pub beta1: Option<f32>,
    /// Second-moment decay for Adam
    pub beta2: Option<f32>,
    /// Stability constant for RMSProp/Adam
    pub epsilon: Option<f32>,
    /// Number of training epochs
    pub epochs: usize,
    /// Seed for weight initialization. An explicit seed (including 0, the
    /// fixed default stream) gives reproducible runs; absent seeds from the
    /// current time.
    pub seed: Option<u64>,
}

/// Loads a network configuration from a JSON file and validates it.
pub fn load_network(path: &str) -> Result<NetworkConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let config: NetworkConfig = serde_json::from_str(&contents)?;
    validate_network(&config)?;
    Ok(config)
}

/// Loads a training configuration from a JSON file and validates it.
pub fn load_training(path: &str) -> Result<TrainingConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_training(&config)?;
    Ok(config)
}

/// Validates a network configuration.
///
/// Checks that the layer list is nonempty, every size is positive, every
/// activation name is known, and each layer's output size matches the next
/// layer's input size.
pub fn validate_network(config: &NetworkConfig) -> Result<(), NetError> {
    if config.layers.is_empty() {
        return Err(NetError::InvalidConfig(
            "network must have at least one layer".to_string(),
        ));
    }

    for (i, layer) in config.layers.iter().enumerate() {
        if layer.input_size == 0 {
            return Err(NetError::InvalidConfig(format!(
                "layer {}: input_size must be greater than 0",
                i
            )));
        }
        if layer.output_size == 0 {
            return Err(NetError::InvalidConfig(format!(
                "layer {}: output_size must be greater than 0",
                i
            )));
        }
        if ActivationKind::parse(&layer.activation).is_none() {
            return Err(NetError::InvalidConfig(format!(
                "layer {}: unknown activation '{}'",
                i, layer.activation
            )));
        }
        if let Some(alpha) = layer.alpha {
            if alpha < 0.0 {
                return Err(NetError::InvalidConfig(format!(
                    "layer {}: alpha must be non-negative",
                    i
                )));
            }
        }
    }

    for i in 0..config.layers.len() - 1 {
        let current = &config.layers[i];
        let next = &config.layers[i + 1];
        if current.output_size != next.input_size {
            return Err(NetError::InvalidConfig(format!(
                "layer connection mismatch: layer {} output size ({}) does not match layer {} input size ({})",
                i,
                current.output_size,
                i + 1,
                next.input_size
            )));
        }
    }

    Ok(())
}

/// Validates a training configuration.
pub fn validate_training(config: &TrainingConfig) -> Result<(), NetError> {
    if LossKind::parse(&config.loss).is_none() {
        return Err(NetError::InvalidConfig(format!(
            "unknown loss '{}'",
            config.loss
        )));
    }

    let valid_optimizers = ["sgd", "rmsprop", "adam"];
    if !valid_optimizers.contains(&config.optimizer.to_lowercase().as_str()) {
        return Err(NetError::InvalidConfig(format!(
            "unknown optimizer '{}'; must be one of: {}",
            config.optimizer,
            valid_optimizers.join(", ")
        )));
    }

    if config.learning_rate <= 0.0 {
        return Err(NetError::InvalidConfig(
            "learning_rate must be positive".to_string(),
        ));
    }
    if let Some(momentum) = config.momentum {
        if !(0.0..1.0).contains(&momentum) {
            return Err(NetError::InvalidConfig(
                "momentum must lie in [0, 1)".to_string(),
            ));
        }
    }
    for (name, value) in [
        ("beta", config.beta),
        ("beta1", config.beta1),
        ("beta2", config.beta2),
    ] {
        if let Some(v) = value {
            if !(0.0..1.0).contains(&v) {
                return Err(NetError::InvalidConfig(format!(
                    "{} must lie in [0, 1)",
                    name
                )));
            }
        }
    }
    if let Some(eps) = config.epsilon {
        if eps <= 0.0 {
            return Err(NetError::InvalidConfig(
                "epsilon must be positive".to_string(),
            ));
        }
    }

    Ok(())
}

/// Build the configured layer stack.
///
/// The caller validates first (or uses [`load_network`], which does); an
/// invalid activation name here is still surfaced as an error rather than
/// a panic.
pub fn build_layers(
    config: &NetworkConfig,
    rng: &mut SimpleRng,
) -> Result<Vec<DenseLayer>, NetError> {
    let mut layers = Vec::with_capacity(config.layers.len());
    for (i, layer) in config.layers.iter().enumerate() {
        let kind = ActivationKind::parse(&layer.activation).ok_or_else(|| {
            NetError::InvalidConfig(format!(
                "layer {}: unknown activation '{}'",
                i, layer.activation
            ))
        })?;
        let activation =
            Activation::with_params(kind, layer.alpha.unwrap_or(0.01), layer.beta.unwrap_or(1.0));
        layers.push(DenseLayer::with_activation(
            layer.input_size,
            layer.output_size,
            activation,
            rng,
        ));
    }
    Ok(layers)
}

/// Build the weight-initialization RNG from the configured seed.
///
/// A missing seed reseeds from the current time; an explicit seed yields the
/// same weight stream on every run.
pub fn build_rng(config: &TrainingConfig) -> SimpleRng {
    match config.seed {
        Some(seed) => SimpleRng::new(seed),
        None => {
            let mut rng = SimpleRng::new(0);
            rng.reseed_from_time();
            rng
        }
    }
}

/// Build the configured loss.
pub fn build_loss(config: &TrainingConfig) -> Result<Loss, NetError> {
    let kind = LossKind::parse(&config.loss)
        .ok_or_else(|| NetError::InvalidConfig(format!("unknown loss '{}'", config.loss)))?;
    Ok(Loss::new(kind, config.num_classes.unwrap_or(0)))
}

/// Build the configured optimizer.
pub fn build_optimizer(config: &TrainingConfig) -> Result<Box<dyn Optimizer>, NetError> {
    let lr = config.learning_rate;
    match config.optimizer.to_lowercase().as_str() {
        "sgd" => Ok(Box::new(Sgd::with_momentum(
            lr,
            config.momentum.unwrap_or(0.0),
        ))),
        "rmsprop" => Ok(Box::new(RmsProp::new(
            lr,
            config.beta.unwrap_or(0.9),
            config.epsilon.unwrap_or(1e-8),
        ))),
        "adam" => Ok(Box::new(Adam::new(
            lr,
            config.beta1.unwrap_or(0.9),
            config.beta2.unwrap_or(0.999),
            config.epsilon.unwrap_or(1e-8),
        ))),
        other => Err(NetError::InvalidConfig(format!(
            "unknown optimizer '{}'",
            other
        ))),
    }
}

/// Build and compile the configured model, with weights initialized from
/// the configured seed.
pub fn build_model(
    network: &NetworkConfig,
    training: &TrainingConfig,
) -> Result<Model, NetError> {
    let mut rng = build_rng(training);
    let mut model = Model::new();
    for layer in build_layers(network, &mut rng)? {
        model.add(layer);
    }
    model.compile(build_loss(training)?, build_optimizer(training)?)?;
    Ok(model)
}

/// Build the configured model and train it on sparse-labeled examples for
/// the configured number of epochs.
pub fn train_from_config(
    network: &NetworkConfig,
    training: &TrainingConfig,
    inputs: &[Tensor],
    labels: &[usize],
) -> Result<Model, NetError> {
    let mut model = build_model(network, training)?;
    model.fit(inputs, labels, training.epochs)?;
    Ok(model)
}
