//! Loss functions with forward (scalar) and backward (gradient) forms
//!
//! Each loss consumes predictions plus an explicit `Target`: dense values
//! for MSE/BCE/categorical cross-entropy, sparse class indices for the
//! sparse variant. The wrong variant is a checked error, not undefined
//! behavior.
//!
//! The categorical and sparse-categorical backward formulas are the
//! combined softmax + cross-entropy gradient; they are only valid when the
//! predictions come out of a softmax whose backward pass is the identity.
//! `Model::compile` enforces that pairing. Likewise the BCE gradient is
//! taken w.r.t. a sigmoid output directly; callers must not apply a
//! sigmoid derivative on top of it.

use crate::activations::ActivationKind;
use crate::error::NetError;
use crate::tensor::Tensor;

/// Supported loss functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    MeanSquaredError,
    BinaryCrossEntropy,
    CategoricalCrossEntropy,
    SparseCategoricalCrossEntropy,
}

impl LossKind {
    /// Parse a configuration name ("mse", "binary_cross_entropy", ...).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "mse" | "mean_squared_error" => Some(Self::MeanSquaredError),
            "binary_cross_entropy" => Some(Self::BinaryCrossEntropy),
            "categorical_cross_entropy" => Some(Self::CategoricalCrossEntropy),
            "sparse_categorical_cross_entropy" => Some(Self::SparseCategoricalCrossEntropy),
            _ => None,
        }
    }

    /// Configuration name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MeanSquaredError => "mean_squared_error",
            Self::BinaryCrossEntropy => "binary_cross_entropy",
            Self::CategoricalCrossEntropy => "categorical_cross_entropy",
            Self::SparseCategoricalCrossEntropy => "sparse_categorical_cross_entropy",
        }
    }
}

/// Training targets, explicit per loss family.
///
/// `Classes` holds one true-class index per prediction row (sparse
/// categorical). `Values` holds a dense tensor shaped like the predictions
/// (MSE, BCE, one-hot/soft categorical).
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Classes(&'a [usize]),
    Values(&'a Tensor),
}

/// Loss function with a numerical-stability floor.
///
/// Stateless apart from its configuration: forward and backward always
/// take explicit predictions and targets.
///
/// # Example
///
/// ```
/// use dnn_engine::{Loss, LossKind, Target, Tensor};
///
/// let loss = Loss::new(LossKind::MeanSquaredError, 0);
/// let pred = Tensor::from_vec(1, 2, vec![1.0, 0.0]);
/// let truth = Tensor::from_vec(1, 2, vec![0.0, 0.0]);
/// let value = loss.forward(&pred, Target::Values(&truth)).unwrap();
/// assert!((value - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Loss {
    kind: LossKind,
    num_classes: usize,
    eps: f32,
}

impl Loss {
    /// Create a loss with the default stability floor (1e-7).
    ///
    /// `num_classes` is informational for the categorical variants and may
    /// be zero for MSE/BCE.
    pub fn new(kind: LossKind, num_classes: usize) -> Self {
        Self::with_epsilon(kind, num_classes, 1e-7)
    }

    /// Create a loss with an explicit stability floor.
    pub fn with_epsilon(kind: LossKind, num_classes: usize, eps: f32) -> Self {
        Self {
            kind,
            num_classes,
            eps,
        }
    }

    /// The selected loss function.
    pub fn kind(&self) -> LossKind {
        self.kind
    }

    /// Class count configured for the categorical variants.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Final-layer activation this loss's gradient assumes, if any.
    ///
    /// The categorical variants emit a combined softmax gradient; BCE's
    /// gradient is taken w.r.t. a raw sigmoid output. MSE pairs with
    /// anything.
    pub fn required_activation(&self) -> Option<ActivationKind> {
        match self.kind {
            LossKind::MeanSquaredError => None,
            LossKind::BinaryCrossEntropy => Some(ActivationKind::Sigmoid),
            LossKind::CategoricalCrossEntropy | LossKind::SparseCategoricalCrossEntropy => {
                Some(ActivationKind::Softmax)
            }
        }
    }

    /// Scalar loss over a batch of predictions.
    pub fn forward(&self, pred: &Tensor, target: Target<'_>) -> Result<f32, NetError> {
        match (self.kind, target) {
            (LossKind::MeanSquaredError, Target::Values(truth)) => Ok(self.mse(pred, truth)),
            (LossKind::BinaryCrossEntropy, Target::Values(truth)) => Ok(self.bce(pred, truth)),
            (LossKind::CategoricalCrossEntropy, Target::Values(truth)) => {
                Ok(self.cce(pred, truth))
            }
            (LossKind::SparseCategoricalCrossEntropy, Target::Classes(classes)) => {
                Ok(self.sparse_cce(pred, classes))
            }
            (kind, wrong) => Err(target_mismatch(kind, wrong)),
        }
    }

    /// Gradient of the loss w.r.t. the predictions, same shape as `pred`.
    pub fn backward(&self, pred: &Tensor, target: Target<'_>) -> Result<Tensor, NetError> {
        match (self.kind, target) {
            (LossKind::MeanSquaredError, Target::Values(truth)) => {
                Ok(self.mse_backward(pred, truth))
            }
            (LossKind::BinaryCrossEntropy, Target::Values(truth)) => {
                Ok(self.bce_backward(pred, truth))
            }
            (LossKind::CategoricalCrossEntropy, Target::Values(truth)) => {
                Ok(self.cce_backward(pred, truth))
            }
            (LossKind::SparseCategoricalCrossEntropy, Target::Classes(classes)) => {
                Ok(self.sparse_cce_backward(pred, classes))
            }
            (kind, wrong) => Err(target_mismatch(kind, wrong)),
        }
    }

    // ---------- Mean squared error ----------

    fn mse(&self, pred: &Tensor, truth: &Tensor) -> f32 {
        assert!(pred.same_shape(truth), "MSE prediction/target shape mismatch");
        let mut loss = 0.0f32;
        for (&p, &t) in pred.data().iter().zip(truth.data()) {
            loss += (p - t) * (p - t);
        }
        loss / pred.len() as f32
    }

    fn mse_backward(&self, pred: &Tensor, truth: &Tensor) -> Tensor {
        assert!(pred.same_shape(truth), "MSE prediction/target shape mismatch");
        let scale = 2.0 / pred.len() as f32;
        let mut grad = Tensor::new(pred.rows(), pred.cols());
        for (g, (&p, &t)) in grad
            .data_mut()
            .iter_mut()
            .zip(pred.data().iter().zip(truth.data()))
        {
            *g = scale * (p - t);
        }
        grad
    }

    // ---------- Binary cross-entropy ----------
    //
    // Operates on column 0 only: one probability per row.

    fn bce(&self, pred: &Tensor, truth: &Tensor) -> f32 {
        let mut loss = 0.0f32;
        for i in 0..pred.rows() {
            let p = pred[(i, 0)].clamp(self.eps, 1.0 - self.eps);
            let y = truth[(i, 0)];
            loss += -(y * p.ln() + (1.0 - y) * (1.0 - p).ln());
        }
        loss / pred.rows() as f32
    }

    fn bce_backward(&self, pred: &Tensor, truth: &Tensor) -> Tensor {
        let mut grad = Tensor::new(pred.rows(), 1);
        for i in 0..pred.rows() {
            let p = pred[(i, 0)].clamp(self.eps, 1.0 - self.eps);
            let y = truth[(i, 0)];
            grad[(i, 0)] = (p - y) / (p * (1.0 - p));
        }
        grad
    }

    // ---------- Categorical cross-entropy ----------
    //
    // Assumes one-hot or soft targets; only positions with a strictly
    // positive target contribute to the forward sum.

    fn cce(&self, pred: &Tensor, truth: &Tensor) -> f32 {
        assert!(pred.same_shape(truth), "CCE prediction/target shape mismatch");
        let mut loss = 0.0f32;
        for (&p, &t) in pred.data().iter().zip(truth.data()) {
            if t > 0.0 {
                loss += -p.max(self.eps).ln();
            }
        }
        loss / pred.rows() as f32
    }

    fn cce_backward(&self, pred: &Tensor, truth: &Tensor) -> Tensor {
        assert!(pred.same_shape(truth), "CCE prediction/target shape mismatch");
        let inv_batch = 1.0 / pred.rows() as f32;
        let mut grad = Tensor::new(pred.rows(), pred.cols());
        for (g, (&p, &t)) in grad
            .data_mut()
            .iter_mut()
            .zip(pred.data().iter().zip(truth.data()))
        {
            *g = (p - t) * inv_batch;
        }
        grad
    }

    // ---------- Sparse categorical cross-entropy ----------

    fn sparse_cce(&self, pred: &Tensor, classes: &[usize]) -> f32 {
        assert_eq!(
            classes.len(),
            pred.rows(),
            "Expected one class index per prediction row"
        );
        let mut loss = 0.0f32;
        for (i, &class) in classes.iter().enumerate() {
            let p = pred[(i, class)].max(self.eps);
            loss += -p.ln();
        }
        loss / pred.rows() as f32
    }

    fn sparse_cce_backward(&self, pred: &Tensor, classes: &[usize]) -> Tensor {
        assert_eq!(
            classes.len(),
            pred.rows(),
            "Expected one class index per prediction row"
        );
        let mut grad = pred.clone();
        for (i, &class) in classes.iter().enumerate() {
            grad[(i, class)] -= 1.0;
        }
        let inv_batch = 1.0 / pred.rows() as f32;
        for value in grad.data_mut() {
            *value *= inv_batch;
        }
        grad
    }
}

fn target_mismatch(kind: LossKind, given: Target<'_>) -> NetError {
    let expected = match given {
        // The caller handed us the opposite variant.
        Target::Classes(_) => "dense value",
        Target::Values(_) => "sparse class-index",
    };
    NetError::TargetMismatch {
        loss: kind.name(),
        expected,
    }
}
