//! Layer implementations
//!
//! The engine is dense-only: a layer is an affine transform (weights +
//! biases) composed with an activation function.

pub mod dense;

pub use dense::DenseLayer;
