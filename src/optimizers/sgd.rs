//! Stochastic gradient descent, with optional momentum

use std::collections::HashMap;

use crate::optimizers::{Optimizer, ParamId};

/// Gradient descent optimizer.
///
/// With `momentum == 0` this is the plain update rule:
///
/// ```text
/// w = w - lr * grad
/// ```
///
/// With `momentum > 0` a per-parameter velocity buffer is maintained,
/// zero-initialized on first use:
///
/// ```text
/// v = momentum * v - lr * grad
/// w = w + v
/// ```
///
/// # Example
///
/// ```
/// use dnn_engine::{Optimizer, ParamId, Sgd};
///
/// let mut optimizer = Sgd::new(0.01);
/// let mut params = vec![1.0, 2.0, 3.0];
/// optimizer.step(ParamId::fresh(), &mut params, &[0.1, 0.2, 0.3]);
/// // params are now [0.999, 1.998, 2.997]
/// ```
pub struct Sgd {
    learning_rate: f32,
    momentum: f32,
    velocity: HashMap<ParamId, Vec<f32>>,
}

impl Sgd {
    /// Plain gradient descent (no momentum).
    pub fn new(learning_rate: f32) -> Self {
        Self::with_momentum(learning_rate, 0.0)
    }

    /// Gradient descent with momentum.
    ///
    /// Typical momentum values are 0.9 to 0.99. A momentum of 0 reduces
    /// this exactly to the plain update rule.
    pub fn with_momentum(learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: HashMap::new(),
        }
    }

    /// The configured momentum factor.
    pub fn momentum(&self) -> f32 {
        self.momentum
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, id: ParamId, data: &mut [f32], grad: &[f32]) {
        assert_eq!(
            data.len(),
            grad.len(),
            "Parameters and gradients must have the same length"
        );

        if self.momentum > 0.0 {
            let v = self
                .velocity
                .entry(id)
                .or_insert_with(|| vec![0.0; data.len()]);
            for i in 0..data.len() {
                v[i] = self.momentum * v[i] - self.learning_rate * grad[i];
                data[i] += v[i];
            }
        } else {
            for (value, g) in data.iter_mut().zip(grad) {
                *value -= self.learning_rate * g;
            }
        }
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
