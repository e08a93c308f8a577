//! Minimal feed-forward neural network engine
//!
//! This crate provides the numerical core of a dense-layer network trained
//! via backpropagation: a 2D tensor primitive, activation functions with
//! hand-derived gradients, loss functions, per-parameter optimizers, and a
//! model type that chains layers into forward/backward pipelines.
//!
//! # Modules
//!
//! - `tensor`: Row-major 2D tensor with matmul, transpose, bias-add, argmax
//! - `activations`: Activation functions with cached forward/backward state
//! - `losses`: Loss functions (MSE, BCE, categorical/sparse cross-entropy)
//! - `layers`: DenseLayer (affine transform + activation)
//! - `optimizers`: Optimizer trait and implementations (SGD, RMSProp, Adam)
//! - `model`: Layer stack with compile/fit/evaluate/predict
//! - `config`: JSON network and training configuration
//! - `utils`: RNG for weight initialization, raw weight-buffer I/O

pub mod activations;
pub mod config;
pub mod error;
pub mod layers;
pub mod losses;
pub mod model;
pub mod optimizers;
pub mod tensor;
pub mod utils;

pub use activations::{Activation, ActivationKind};
pub use error::NetError;
pub use layers::DenseLayer;
pub use losses::{Loss, LossKind, Target};
pub use model::Model;
pub use optimizers::{Adam, Optimizer, ParamId, RmsProp, Sgd};
pub use tensor::Tensor;
