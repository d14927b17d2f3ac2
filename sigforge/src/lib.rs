//! IIR filter synthesis, response analysis and test-signal generation.
//!
//! The engine is split the way a filter is used: [`signal::filter::design`]
//! turns a [`FilterSpec`](signal::filter::design::FilterSpec) into
//! coefficients, [`signal::response`] measures what those coefficients do,
//! [`signal::filter`] runs them over data and [`signal::wave`] produces the
//! data to run them over. [`api`] wraps all of it in serializable
//! request/response records.
#![warn(missing_docs)]

pub use sigforge_core::{Error, Result};

/// Serializable request/response surface
pub mod api;

/// Complex arithmetic helpers
pub mod complex;

/// Trait-first kernel substrate
pub mod kernel;

/// Linear algebra
pub mod linalg;

/// Signal processing
pub mod signal;
