//! Error type for recoverable failures
//!
//! Shape and dimension violations inside the numerical core are programmer
//! errors and panic via assertions. `NetError` covers the conditions a
//! caller can actually get wrong at runtime: handing a loss the wrong
//! target variant, compiling an inconsistent model, or feeding malformed
//! configuration and weight files.

use thiserror::Error;

/// Recoverable errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum NetError {
    /// A loss was given the wrong target variant (sparse class indices
    /// where a dense tensor is required, or vice versa).
    #[error("{loss} loss requires {expected} targets")]
    TargetMismatch {
        loss: &'static str,
        expected: &'static str,
    },

    /// The compiled loss's gradient is only valid when paired with a
    /// specific final-layer activation.
    #[error("{loss} loss requires a {required} final activation, found {found}")]
    LossActivationMismatch {
        loss: &'static str,
        required: &'static str,
        found: &'static str,
    },

    /// The compiled loss's gradient has a fixed width that the final
    /// layer's output does not match.
    #[error("{loss} loss requires a final layer with {expected} outputs, found {found}")]
    OutputWidthMismatch {
        loss: &'static str,
        expected: usize,
        found: usize,
    },

    /// Training was requested before `Model::compile` bound a loss and an
    /// optimizer.
    #[error("model must be compiled before training")]
    NotCompiled,

    /// A configuration file failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A raw weight file did not contain exactly the expected number of
    /// f32 values.
    #[error("weight file {path} holds {found} values, expected {expected}")]
    WeightSizeMismatch {
        path: String,
        expected: usize,
        found: usize,
    },
}
