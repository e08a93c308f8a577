//! RMSProp: gradient descent normalized by a moving average of squared
//! gradients

use std::collections::HashMap;

use crate::optimizers::{Optimizer, ParamId};

/// RMSProp optimizer.
///
/// Maintains a per-parameter moving average of squared gradients and
/// divides each update by its square root, so parameters with consistently
/// large gradients take smaller steps:
///
/// ```text
/// v = beta * v + (1 - beta) * grad²
/// w = w - lr * grad / (sqrt(v) + epsilon)
/// ```
///
/// Typical values: `beta` 0.9, `epsilon` 1e-8.
pub struct RmsProp {
    learning_rate: f32,
    beta: f32,
    epsilon: f32,
    cache: HashMap<ParamId, Vec<f32>>,
}

impl RmsProp {
    /// Creates a new RMSProp optimizer.
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - step size (must be positive)
    /// * `beta` - decay rate of the squared-gradient average (0 < beta < 1)
    /// * `epsilon` - stability constant added to the denominator
    pub fn new(learning_rate: f32, beta: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta,
            epsilon,
            cache: HashMap::new(),
        }
    }
}

impl Optimizer for RmsProp {
    fn step(&mut self, id: ParamId, data: &mut [f32], grad: &[f32]) {
        assert_eq!(
            data.len(),
            grad.len(),
            "Parameters and gradients must have the same length"
        );

        let v = self
            .cache
            .entry(id)
            .or_insert_with(|| vec![0.0; data.len()]);
        for i in 0..data.len() {
            v[i] = self.beta * v[i] + (1.0 - self.beta) * grad[i] * grad[i];
            data[i] -= self.learning_rate * grad[i] / (v[i].sqrt() + self.epsilon);
        }
    }

    fn reset(&mut self) {
        self.cache.clear();
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
