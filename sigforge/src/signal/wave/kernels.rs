//! Trait-first kernels for waveform generation.

use nalgebra::RealField;
use num_traits::{One, Zero};

use crate::kernel::{
    bind_output, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D,
};
use crate::signal::traits::{SawtoothWave1D, SquareWave1D, UnitImpulse1D, UnitStep1D};

fn wrap_phase<F>(t: F) -> F
where
    F: RealField + Copy,
{
    let two_pi = F::two_pi();
    let mut x = t % two_pi;
    if x < F::zero() {
        x += two_pi;
    }
    x
}

/// Constructor config for [`SquareWaveKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareWaveConfig<F>
where
    F: RealField + Copy,
{
    /// Duty cycle in the interval `[0, 1]`.
    pub duty: F,
}

/// Trait-first 1D square-wave generator.
///
/// Period `2*pi`; `+1` on `[0, 2*pi*duty]` and `-1` elsewhere. With duty
/// `0.5` this is `+1` exactly where `sin(t) >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareWaveKernel<F>
where
    F: RealField + Copy,
{
    duty: F,
}

impl<F> SquareWaveKernel<F>
where
    F: RealField + Copy,
{
    /// Return configured duty cycle.
    pub fn duty(&self) -> F {
        self.duty
    }

    pub(super) fn sample(&self, t: F) -> F {
        if wrap_phase(t) <= F::two_pi() * self.duty {
            F::one()
        } else {
            -F::one()
        }
    }
}

impl<F> KernelLifecycle for SquareWaveKernel<F>
where
    F: RealField + Copy,
{
    type Config = SquareWaveConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if !(config.duty >= F::zero() && config.duty <= F::one()) {
            return Err(ConfigError::InvalidArgument {
                arg: "duty",
                reason: "duty must be in [0, 1]",
            });
        }
        Ok(Self { duty: config.duty })
    }
}

impl<F> SquareWave1D<F> for SquareWaveKernel<F>
where
    F: RealField + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice()?;
        let out = bind_output(out, input.len())?;
        out.iter_mut()
            .zip(input)
            .for_each(|(out, t)| *out = self.sample(*t));
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice()?;
        Ok(input.iter().map(|t| self.sample(*t)).collect())
    }
}

/// Constructor config for [`SawtoothWaveKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SawtoothWaveConfig<F>
where
    F: RealField + Copy,
{
    /// Width of the rising ramp in `[0, 1]`.
    pub width: F,
}

/// Trait-first 1D sawtooth-wave generator.
///
/// Rises from `-1` to `1` over `[0, 2*pi*width)` and falls back over the rest
/// of the period. Width `1` is a plain ramp, width `0.5` a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SawtoothWaveKernel<F>
where
    F: RealField + Copy,
{
    width: F,
}

impl<F> SawtoothWaveKernel<F>
where
    F: RealField + Copy,
{
    /// Return configured width.
    pub fn width(&self) -> F {
        self.width
    }

    pub(super) fn sample(&self, t: F) -> F {
        let x = wrap_phase(t);
        let pi = F::pi();

        if self.width == F::zero() {
            return F::one() - x / pi;
        }
        if self.width == F::one() {
            return x / pi - F::one();
        }

        if x < F::two_pi() * self.width {
            x / (pi * self.width) - F::one()
        } else {
            (pi * (self.width + F::one()) - x) / (pi * (F::one() - self.width))
        }
    }
}

impl<F> KernelLifecycle for SawtoothWaveKernel<F>
where
    F: RealField + Copy,
{
    type Config = SawtoothWaveConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if !(config.width >= F::zero() && config.width <= F::one()) {
            return Err(ConfigError::InvalidArgument {
                arg: "width",
                reason: "width must be in [0, 1]",
            });
        }
        Ok(Self {
            width: config.width,
        })
    }
}

impl<F> SawtoothWave1D<F> for SawtoothWaveKernel<F>
where
    F: RealField + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice()?;
        let out = bind_output(out, input.len())?;
        out.iter_mut()
            .zip(input)
            .for_each(|(out, t)| *out = self.sample(*t));
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice()?;
        Ok(input.iter().map(|t| self.sample(*t)).collect())
    }
}

/// Constructor config for [`UnitImpulseKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitImpulseConfig {
    /// Number of output samples.
    pub len: usize,
    /// Index at which the impulse is set to one.
    pub idx: usize,
}

/// Trait-first 1D unit-impulse generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitImpulseKernel {
    len: usize,
    idx: usize,
}

impl UnitImpulseKernel {
    /// Return configured impulse length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; construction rejects empty impulses.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return configured impulse index.
    pub fn idx(&self) -> usize {
        self.idx
    }
}

impl KernelLifecycle for UnitImpulseKernel {
    type Config = UnitImpulseConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.len == 0 {
            return Err(ConfigError::EmptyInput { arg: "len" });
        }
        if config.idx >= config.len {
            return Err(ConfigError::InvalidArgument {
                arg: "idx",
                reason: "impulse index must be within [0, len)",
            });
        }
        Ok(Self {
            len: config.len,
            idx: config.idx,
        })
    }
}

impl<T> UnitImpulse1D<T> for UnitImpulseKernel
where
    T: Zero + One + Copy,
{
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized,
    {
        let out = bind_output(out, self.len)?;
        out.fill(T::zero());
        out[self.idx] = T::one();
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation> {
        let mut out = vec![T::zero(); self.len];
        out[self.idx] = T::one();
        Ok(out)
    }
}

/// Constructor config for [`UnitStepKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStepConfig {
    /// Number of output samples.
    pub len: usize,
}

/// Trait-first 1D unit-step generator: `len` ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStepKernel {
    len: usize,
}

impl KernelLifecycle for UnitStepKernel {
    type Config = UnitStepConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.len == 0 {
            return Err(ConfigError::EmptyInput { arg: "len" });
        }
        Ok(Self { len: config.len })
    }
}

impl<T> UnitStep1D<T> for UnitStepKernel
where
    T: One + Copy,
{
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized,
    {
        bind_output(out, self.len)?.fill(T::one());
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation> {
        Ok(vec![T::one(); self.len])
    }
}
