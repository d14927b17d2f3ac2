//! Waveform generation.
//!
//! [`generate`] synthesizes a complete test [`Signal`] from a [`SignalSpec`].
//! The phase-domain shapes it is built from ([`square`], [`sawtooth`]) and the
//! probe sequences used by the response engine ([`unit_impulse`],
//! [`unit_step`]) are exposed as well.

use nalgebra::RealField;
use ndarray::{Array, Array1, ArrayBase, Data, Dimension};
use sigforge_core::Result;

use crate::kernel::KernelLifecycle;
use crate::signal::traits::{SawtoothWave1D, SquareWave1D, UnitImpulse1D, UnitStep1D};

mod generator;
mod kernels;

pub use generator::*;
pub use kernels::*;

fn reshape<F, D>(dim: D, flat: Vec<F>) -> Result<Array<F, D>>
where
    D: Dimension,
{
    Array::from_shape_vec(dim, flat).map_err(|_| sigforge_core::Error::invalid_spec("t", "shape"))
}

/// Periodic square wave with period `2*pi`.
///
/// `+1` on `[0, 2*pi*duty]`, `-1` on the rest of the period.
pub fn square<F, S, D>(t: &ArrayBase<S, D>, duty: F) -> Result<Array<F, D>>
where
    F: RealField + Copy,
    S: Data<Elem = F>,
    D: Dimension,
{
    let kernel = SquareWaveKernel::try_new(SquareWaveConfig { duty })?;
    let flat_t = t.iter().copied().collect::<Vec<_>>();
    reshape(t.raw_dim(), kernel.run_alloc(&flat_t)?)
}

/// Periodic sawtooth with period `2*pi`.
///
/// Rises from `-1` to `1` over `[0, 2*pi*width)` and falls from `1` to `-1`
/// over `[2*pi*width, 2*pi)`.
pub fn sawtooth<F, S, D>(t: &ArrayBase<S, D>, width: F) -> Result<Array<F, D>>
where
    F: RealField + Copy,
    S: Data<Elem = F>,
    D: Dimension,
{
    let kernel = SawtoothWaveKernel::try_new(SawtoothWaveConfig { width })?;
    let flat_t = t.iter().copied().collect::<Vec<_>>();
    reshape(t.raw_dim(), kernel.run_alloc(&flat_t)?)
}

/// Kronecker delta of length `len` at `idx` (default `0`).
pub fn unit_impulse<F>(len: usize, idx: Option<usize>) -> Result<Array1<F>>
where
    F: RealField + Copy,
{
    let kernel = UnitImpulseKernel::try_new(UnitImpulseConfig {
        len,
        idx: idx.unwrap_or(0),
    })?;
    let mut out = Array1::from_elem(len, F::zero());
    kernel.run_into(&mut out)?;
    Ok(out)
}

/// `len` ones.
pub fn unit_step<F>(len: usize) -> Result<Array1<F>>
where
    F: RealField + Copy,
{
    let kernel = UnitStepKernel::try_new(UnitStepConfig { len })?;
    let mut out = Array1::from_elem(len, F::zero());
    kernel.run_into(&mut out)?;
    Ok(out)
}
