//! Optimizer abstractions for parameter updates
//!
//! Optimizers mutate a parameter buffer in place using its gradient. Stateful
//! optimizers (momentum, RMSProp, Adam) keep per-parameter auxiliary buffers
//! keyed by a stable [`ParamId`] rather than by address, so state survives
//! moves and copies of the owning layer.
//!
//! # Available optimizers
//!
//! - [`Sgd`]: gradient descent, optionally with momentum
//! - [`RmsProp`]: moving average of squared gradients
//! - [`Adam`]: adaptive moment estimation with bias correction
//!
//! # Example
//!
//! ```
//! use dnn_engine::{Optimizer, ParamId, Sgd};
//!
//! let mut optimizer = Sgd::new(0.1);
//! let id = ParamId::fresh();
//! let mut weights = vec![1.0, 2.0];
//! let grads = vec![0.5, 0.5];
//!
//! optimizer.step(id, &mut weights, &grads);
//! assert_eq!(weights, vec![0.95, 1.95]);
//! ```

pub mod adam;
pub mod rmsprop;
pub mod sgd;

pub use adam::Adam;
pub use rmsprop::RmsProp;
pub use sgd::Sgd;

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity for one parameter buffer (a weight matrix or a bias
/// vector).
///
/// Minted once at construction from a process-wide counter and used as the
/// key for per-parameter optimizer state. Two layers never share an id, and
/// an id never changes when its layer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(u64);

impl ParamId {
    /// Allocate a fresh, never-before-seen id.
    pub fn fresh() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Core trait for optimizers.
///
/// `step` applies one update to a parameter buffer, in place. Auxiliary
/// state (velocity, moment estimates) is created lazily the first time an
/// id is stepped and persists for the optimizer's lifetime.
///
/// # Panics
///
/// Implementations panic if `data` and `grad` have different lengths: a
/// length mismatch means the caller paired a buffer with the wrong
/// gradient, which is a programmer error.
pub trait Optimizer {
    /// Update `data` in place using `grad`, keyed by `id` for any
    /// per-parameter state.
    fn step(&mut self, id: ParamId, data: &mut [f32], grad: &[f32]);

    /// Clear accumulated state (velocity, moments, timestep). A no-op for
    /// stateless optimizers.
    fn reset(&mut self);

    /// Base learning rate. Adaptive optimizers apply different effective
    /// rates per parameter.
    fn learning_rate(&self) -> f32;

    /// Replace the base learning rate; hook for external schedules.
    fn set_learning_rate(&mut self, lr: f32);
}
