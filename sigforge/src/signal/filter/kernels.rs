//! Trait-first kernel wrappers for filtering primitives.

use num_traits::NumAssign;

use super::direct_form;
use crate::kernel::{
    bind_output, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D,
};
use crate::signal::traits::LFilter1D;

/// Constructor config for [`LFilterKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct LFilterConfig<T> {
    /// Numerator coefficients.
    pub b: Vec<T>,
    /// Denominator coefficients, used as given.
    pub a: Vec<T>,
}

/// 1D direct-form IIR/FIR kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct LFilterKernel<T> {
    b: Vec<T>,
    a: Vec<T>,
}

impl<T> LFilterKernel<T> {
    /// Numerator coefficients.
    pub fn b(&self) -> &[T] {
        &self.b
    }

    /// Denominator coefficients.
    pub fn a(&self) -> &[T] {
        &self.a
    }
}

impl<T> KernelLifecycle for LFilterKernel<T>
where
    T: NumAssign + Copy,
{
    type Config = LFilterConfig<T>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.b.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "b" });
        }
        if config.a.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "a" });
        }
        Ok(Self {
            b: config.b,
            a: config.a,
        })
    }
}

impl<T> LFilter1D<T> for LFilterKernel<T>
where
    T: NumAssign + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized,
    {
        let input = input.read_slice()?;
        if input.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "x" }.into());
        }
        let out = bind_output(out, input.len())?;
        direct_form(&self.b, &self.a, input, out);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let len = input.read_slice()?.len();
        let mut out = vec![T::zero(); len];
        self.run_into(input, &mut out)?;
        Ok(out)
    }
}
