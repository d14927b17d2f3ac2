/// Digital IIR filter synthesis.
pub mod design;

mod kernels;
mod lfilter;

pub use kernels::*;
pub use lfilter::*;
