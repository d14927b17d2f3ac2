//! Trait interfaces for signal-processing capabilities.
//!
//! Kernels are built from a validated config through
//! [`KernelLifecycle`](crate::kernel::KernelLifecycle) and then run through
//! one of these capability traits.

use nalgebra::{Complex, RealField};

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use crate::signal::filter::design::{BaFormatFilter, ZpkFormatFilter};

/// 1D square-wave generation capability.
pub trait SquareWave1D<T> {
    /// Generate a square wave from phase input into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Generate a square wave and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D sawtooth-wave generation capability.
pub trait SawtoothWave1D<T> {
    /// Generate a sawtooth wave from phase input into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Generate a sawtooth wave and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D unit-impulse generation capability.
pub trait UnitImpulse1D<T> {
    /// Generate a unit impulse into a caller-provided output buffer.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Generate a unit impulse and allocate output.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}

/// 1D unit-step generation capability.
pub trait UnitStep1D<T> {
    /// Generate a unit step into a caller-provided output buffer.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Generate a unit step and allocate output.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}

/// Waveform synthesis capability.
pub trait SignalGenerate {
    /// Generated signal representation.
    type Output;

    /// Synthesize the configured signal.
    fn run_alloc(&self) -> Result<Self::Output, ExecInvariantViolation>;
}

/// 1D `lfilter` capability.
pub trait LFilter1D<T> {
    /// Run filtering into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run filtering and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Frequency-response evaluation capability.
pub trait FreqResponse<T> {
    /// Sampled response representation.
    type Output;

    /// Evaluate `H(e^{jw})` of `b / a` on the kernel's frequency grid.
    fn run_alloc(&self, b: &[T], a: &[T]) -> Result<Self::Output, ExecInvariantViolation>;
}

/// 1D magnitude-spectrum capability.
pub trait Spectrum1D<T> {
    /// Spectrum representation.
    type Output;

    /// Compute the one-sided magnitude spectrum of the input.
    fn run_alloc<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// IIR design capability.
pub trait IirDesign {
    /// Output representation produced by the design kernel.
    type Output;

    /// Run IIR design and allocate output representation.
    fn run_alloc(&self) -> Result<Self::Output, ExecInvariantViolation>;
}

/// ZPK-domain transform capability.
pub trait ZpkTransform<T>
where
    T: RealField + Copy,
{
    /// Run a ZPK-domain transform and allocate the transformed representation.
    fn run_alloc(&self, zpk: ZpkFormatFilter<T>) -> Result<ZpkFormatFilter<T>, ExecInvariantViolation>;
}

/// ZPK to transfer-function conversion capability.
pub trait ZpkToTfDesign<T>
where
    T: RealField + Copy,
{
    /// Convert poles/zeros/gain into transfer-function coefficients.
    fn run_alloc(
        &self,
        zeros: &[Complex<T>],
        poles: &[Complex<T>],
        gain: T,
    ) -> Result<BaFormatFilter<T>, ExecInvariantViolation>;
}
