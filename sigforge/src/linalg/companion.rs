use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D};
use nalgebra::{Complex, DMatrix, RealField};

/// 1D companion-matrix construction capability.
pub trait CompanionBuild1D<T> {
    /// Output matrix type.
    type Output;

    /// Build companion matrix from polynomial coefficients.
    fn run<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Constructor config for [`CompanionKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanionConfig {
    /// Optional expected coefficient length.
    pub expected_len: Option<usize>,
}

/// Trait-first companion-matrix kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanionKernel {
    expected_len: Option<usize>,
}

impl KernelLifecycle for CompanionKernel {
    type Config = CompanionConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if matches!(config.expected_len, Some(len) if len < 2) {
            return Err(ConfigError::InvalidArgument {
                arg: "expected_len",
                reason: "companion requires at least 2 coefficients",
            });
        }
        Ok(Self {
            expected_len: config.expected_len,
        })
    }
}

impl<T> CompanionBuild1D<T> for CompanionKernel
where
    T: RealField + Copy,
{
    type Output = DMatrix<T>;

    fn run<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let coeffs = input.read_slice()?;
        if coeffs.len() < 2 {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "companion requires at least 2 coefficients",
            });
        }
        if let Some(expected) = self.expected_len {
            if coeffs.len() != expected {
                return Err(ExecInvariantViolation::LengthMismatch {
                    arg: "coeffs",
                    expected,
                    got: coeffs.len(),
                });
            }
        }
        if coeffs[0] == T::zero() {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "leading coefficient must be non-zero",
            });
        }

        // First row holds -c[1..] / c[0]; ones run along the sub-diagonal.
        let n = coeffs.len() - 1;
        let lead = coeffs[0];
        Ok(DMatrix::from_fn(n, n, |r, c| match r {
            0 => -coeffs[c + 1] / lead,
            _ if r == c + 1 => T::one(),
            _ => T::zero(),
        }))
    }
}

/// Companion matrix of a polynomial given in descending powers.
pub fn companion_dyn<T>(coeffs: &[T]) -> Result<DMatrix<T>, ExecInvariantViolation>
where
    T: RealField + Copy,
{
    CompanionKernel::default().run(coeffs)
}

/// Roots of a polynomial given in descending powers.
///
/// Leading zeros are dropped. Trailing zeros contribute roots at the origin.
/// The remaining roots are the eigenvalues of the companion matrix, so they
/// carry the usual eigen-solver rounding.
pub fn roots<T>(coeffs: &[T]) -> Result<Vec<Complex<T>>, ExecInvariantViolation>
where
    T: RealField + Copy,
{
    let Some(first) = coeffs.iter().position(|c| *c != T::zero()) else {
        return Ok(Vec::new());
    };
    let last = coeffs
        .iter()
        .rposition(|c| *c != T::zero())
        .unwrap_or(first);
    let trimmed = &coeffs[first..=last];
    let at_origin = coeffs.len() - 1 - last;

    let mut out = if trimmed.len() > 1 {
        companion_dyn(trimmed)?
            .complex_eigenvalues()
            .iter()
            .copied()
            .collect::<Vec<_>>()
    } else {
        Vec::new()
    };
    out.extend(core::iter::repeat(Complex::new(T::zero(), T::zero())).take(at_origin));
    Ok(out)
}
