//! Shared building blocks for the `sigforge` workspace.
//!
//! This crate holds the engine-wide [`Error`] type and the numpy-flavoured
//! polynomial helpers in [`num_rs`] that filter synthesis builds upon.

mod error;

/// Numpy-like array primitives.
pub mod num_rs;

pub use error::*;
