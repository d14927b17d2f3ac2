//! Shared trait-first kernel substrate.
//!
//! Every engine entry point is backed by a `*Config` struct that is validated
//! once by [`KernelLifecycle::try_new`], plus a capability trait whose
//! `run_into`/`run_alloc` methods bind 1D buffers through [`Read1D`] and
//! [`Write1D`].

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
