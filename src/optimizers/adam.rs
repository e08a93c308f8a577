//! Adam (Adaptive Moment Estimation) optimizer

use std::collections::HashMap;

use crate::optimizers::{Optimizer, ParamId};

/// Adam optimizer.
///
/// Combines momentum and adaptive learning rates: a per-parameter first
/// moment (mean of gradients) and second moment (uncentered variance), both
/// corrected for their zero initialization bias:
///
/// ```text
/// m = beta1 * m + (1 - beta1) * grad
/// v = beta2 * v + (1 - beta2) * grad²
/// m_hat = m / (1 - beta1^t)
/// v_hat = v / (1 - beta2^t)
/// w = w - lr * m_hat / (sqrt(v_hat) + epsilon)
/// ```
///
/// The timestep `t` is shared across all parameters and advances once per
/// `step` call. A training loop must therefore call `step` exactly once per
/// parameter per logical step, so every parameter sees a consistent
/// bias-correction exponent.
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic
/// optimization. arXiv:1412.6980.
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// First moment estimates per parameter.
    m: HashMap<ParamId, Vec<f32>>,
    /// Second moment estimates per parameter.
    v: HashMap<ParamId, Vec<f32>>,
    /// Shared timestep for bias correction.
    t: u32,
}

impl Adam {
    /// Creates a new Adam optimizer.
    ///
    /// The paper's recommended defaults work well across problems:
    /// `learning_rate` 0.001, `beta1` 0.9, `beta2` 0.999, `epsilon` 1e-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use dnn_engine::{Adam, Optimizer};
    ///
    /// let optimizer = Adam::new(0.001, 0.9, 0.999, 1e-8);
    /// assert_eq!(optimizer.learning_rate(), 0.001);
    /// ```
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// Current timestep (number of `step` calls since construction or the
    /// last `reset`).
    pub fn timestep(&self) -> u32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, id: ParamId, data: &mut [f32], grad: &[f32]) {
        assert_eq!(
            data.len(),
            grad.len(),
            "Parameters and gradients must have the same length"
        );

        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        let m = self.m.entry(id).or_insert_with(|| vec![0.0; data.len()]);
        let v = self.v.entry(id).or_insert_with(|| vec![0.0; data.len()]);

        for i in 0..data.len() {
            m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * grad[i];
            v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * grad[i] * grad[i];

            let m_hat = m[i] / bias_correction1;
            let v_hat = v[i] / bias_correction2;

            data[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
