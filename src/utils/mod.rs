//! Shared utilities
//!
//! Random number generation for weight initialization and raw weight-buffer
//! / text input loaders for exchanging state with external tooling.

pub mod io;
pub mod rng;

pub use rng::SimpleRng;
