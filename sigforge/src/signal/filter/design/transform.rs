//! Zero-pole-gain transforms between prototype, analog and digital filters.

use nalgebra::{Complex, RealField};
use sigforge_core::num_rs::polymul;

use super::{relative_degree_checked, BaFormatFilter, ZpkFormatFilter};
use crate::complex::{cdiv, prod_diff};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::signal::traits::{ZpkToTfDesign, ZpkTransform};

/// Imaginary parts below this are treated as exactly real.
pub const REAL_ROOT_TOLERANCE: f64 = 1e-10;

/// Transform selected by a [`ZpkTransformKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZpkTransformKind<F> {
    /// Lowpass prototype to lowpass with cutoff `wo` (rad/s).
    Lp2Lp {
        /// Target cutoff.
        wo: F,
    },
    /// Lowpass prototype to highpass with cutoff `wo` (rad/s).
    Lp2Hp {
        /// Target cutoff.
        wo: F,
    },
    /// Analog to digital through `s = 2 fs (z - 1) / (z + 1)`.
    Bilinear {
        /// Sample rate of the bilinear map.
        fs: F,
    },
}

/// Constructor config for [`ZpkTransformKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZpkTransformConfig<F> {
    /// Which transform to apply.
    pub kind: ZpkTransformKind<F>,
}

/// Trait-first zpk transform kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZpkTransformKernel<F> {
    kind: ZpkTransformKind<F>,
}

impl<F> KernelLifecycle for ZpkTransformKernel<F>
where
    F: RealField + Copy,
{
    type Config = ZpkTransformConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let (arg, value) = match config.kind {
            ZpkTransformKind::Lp2Lp { wo } | ZpkTransformKind::Lp2Hp { wo } => ("wo", wo),
            ZpkTransformKind::Bilinear { fs } => ("fs", fs),
        };
        if !(value > F::zero()) || !value.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg,
                reason: "transform parameter must be finite and > 0",
            });
        }
        Ok(Self { kind: config.kind })
    }
}

impl<F> ZpkTransform<F> for ZpkTransformKernel<F>
where
    F: RealField + Copy,
{
    fn run_alloc(
        &self,
        zpk: ZpkFormatFilter<F>,
    ) -> Result<ZpkFormatFilter<F>, ExecInvariantViolation> {
        let degree = relative_degree_checked(&zpk.z, &zpk.p)?;
        let out = match self.kind {
            ZpkTransformKind::Lp2Lp { wo } => {
                let scale = |r: &Complex<F>| Complex::new(r.re * wo, r.im * wo);
                let k = (0..degree).fold(zpk.k, |k, _| k * wo);
                ZpkFormatFilter::new(
                    zpk.z.iter().map(scale).collect(),
                    zpk.p.iter().map(scale).collect(),
                    k,
                )
            }
            ZpkTransformKind::Lp2Hp { wo } => {
                let invert = |r: &Complex<F>| cdiv(Complex::new(wo, F::zero()), *r);
                let origin = Complex::new(F::zero(), F::zero());
                let mut z = zpk.z.iter().map(invert).collect::<Vec<_>>();
                z.extend(core::iter::repeat(origin).take(degree));
                let p = zpk.p.iter().map(invert).collect();
                // prod(-z) / prod(-p) == prod(0 - z) / prod(0 - p)
                let ratio = cdiv(prod_diff(origin, &zpk.z), prod_diff(origin, &zpk.p));
                ZpkFormatFilter::new(z, p, zpk.k * ratio.re)
            }
            ZpkTransformKind::Bilinear { fs } => {
                let fs2 = Complex::new(fs + fs, F::zero());
                let map = |r: &Complex<F>| {
                    cdiv(
                        Complex::new(fs2.re + r.re, r.im),
                        Complex::new(fs2.re - r.re, -r.im),
                    )
                };
                let mut z = zpk.z.iter().map(map).collect::<Vec<_>>();
                z.extend(core::iter::repeat(Complex::new(-F::one(), F::zero())).take(degree));
                let p = zpk.p.iter().map(map).collect();
                let ratio = cdiv(prod_diff(fs2, &zpk.z), prod_diff(fs2, &zpk.p));
                ZpkFormatFilter::new(z, p, zpk.k * ratio.re)
            }
        };
        Ok(out)
    }
}

fn transform<F>(
    zpk: ZpkFormatFilter<F>,
    kind: ZpkTransformKind<F>,
) -> Result<ZpkFormatFilter<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    ZpkTransformKernel::try_new(ZpkTransformConfig { kind })?.run_alloc(zpk)
}

/// Move a unit-cutoff lowpass prototype to cutoff `wo`.
pub fn lp2lp_zpk<F>(zpk: ZpkFormatFilter<F>, wo: F) -> Result<ZpkFormatFilter<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    transform(zpk, ZpkTransformKind::Lp2Lp { wo })
}

/// Turn a unit-cutoff lowpass prototype into a highpass with cutoff `wo`.
///
/// Substitutes `s -> wo / s`; the relative degree reappears as zeros at the
/// origin.
pub fn lp2hp_zpk<F>(zpk: ZpkFormatFilter<F>, wo: F) -> Result<ZpkFormatFilter<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    transform(zpk, ZpkTransformKind::Lp2Hp { wo })
}

/// Map an analog filter to the z-plane with the bilinear transform.
///
/// Zeros at infinity land on `z = -1`.
pub fn bilinear_zpk<F>(zpk: ZpkFormatFilter<F>, fs: F) -> Result<ZpkFormatFilter<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    transform(zpk, ZpkTransformKind::Bilinear { fs })
}

/// Real polynomial (descending powers) with the given roots.
///
/// Roots with `|im| < REAL_ROOT_TOLERANCE` give a first-order factor
/// `(1, -re)`. Each conjugate pair gives one second-order factor
/// `(1, -2 re, re^2 + im^2)`, built from the root with positive imaginary
/// part.
pub fn poly_from_roots<F>(roots: &[Complex<F>]) -> Result<Vec<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    let tol: F = nalgebra::convert(REAL_ROOT_TOLERANCE);
    let upper = roots.iter().filter(|r| r.im >= tol).count();
    let lower = roots.iter().filter(|r| r.im <= -tol).count();
    if upper != lower {
        return Err(ExecInvariantViolation::InvalidState {
            reason: "complex roots must come in conjugate pairs",
        });
    }

    let two: F = nalgebra::convert(2.0);
    roots
        .iter()
        .filter(|r| r.im > -tol)
        .try_fold(vec![F::one()], |acc, r| {
            let factor = if r.im.abs() < tol {
                vec![F::one(), -r.re]
            } else {
                vec![F::one(), -two * r.re, r.re * r.re + r.im * r.im]
            };
            polymul(&acc, &factor)
        })
        .map_err(|_| ExecInvariantViolation::InvalidState {
            reason: "polynomial product failed",
        })
}

/// Zero-pole-gain to transfer function conversion kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZpkToTfKernel;

impl KernelLifecycle for ZpkToTfKernel {
    type Config = ();

    fn try_new(_config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self)
    }
}

impl<F> ZpkToTfDesign<F> for ZpkToTfKernel
where
    F: RealField + Copy,
{
    fn run_alloc(
        &self,
        zeros: &[Complex<F>],
        poles: &[Complex<F>],
        gain: F,
    ) -> Result<BaFormatFilter<F>, ExecInvariantViolation> {
        let b = poly_from_roots(zeros)?
            .into_iter()
            .map(|c| c * gain)
            .collect();
        let a = poly_from_roots(poles)?;
        Ok(BaFormatFilter::new(b, a))
    }
}

/// Expand zeros, poles and gain into `b` and `a` coefficients.
pub fn zpk2tf<F>(zpk: &ZpkFormatFilter<F>) -> Result<BaFormatFilter<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    ZpkToTfKernel.run_alloc(&zpk.z, &zpk.p, zpk.k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::filter::design::buttap;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lp2lp_scales_poles_and_gain() {
        let zpk = lp2lp_zpk(buttap::<f64>(3), 2.0).unwrap();
        zpk.p
            .iter()
            .for_each(|p| assert_abs_diff_eq!(crate::complex::magnitude(*p), 2.0, epsilon = 1e-12));
        assert_abs_diff_eq!(zpk.k, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn lp2hp_puts_relative_degree_at_origin() {
        let zpk = lp2hp_zpk(buttap::<f64>(4), 0.5).unwrap();
        assert_eq!(zpk.z.len(), 4);
        assert!(zpk.z.iter().all(|z| z.re == 0.0 && z.im == 0.0));
        zpk.p
            .iter()
            .for_each(|p| assert_abs_diff_eq!(crate::complex::magnitude(*p), 0.5, epsilon = 1e-12));
        assert_abs_diff_eq!(zpk.k, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bilinear_maps_infinite_zeros_to_nyquist() {
        let zpk = bilinear_zpk(buttap::<f64>(2), 0.5).unwrap();
        assert_eq!(zpk.z, vec![Complex::new(-1.0, 0.0); 2]);
        // Left half-plane poles land inside the unit circle.
        assert!(zpk.p.iter().all(|p| crate::complex::magnitude(*p) < 1.0));
        assert_abs_diff_eq!(zpk.k, 1.0 / (2.0 + 2f64.sqrt()), epsilon = 1e-12);
    }

    #[test]
    fn transform_kernel_rejects_non_positive_parameters() {
        let err = ZpkTransformKernel::try_new(ZpkTransformConfig {
            kind: ZpkTransformKind::Bilinear { fs: 0.0f64 },
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidArgument {
                arg: "fs",
                reason: "transform parameter must be finite and > 0",
            }
        );
    }

    #[test]
    fn poly_from_roots_pairs_conjugates() {
        let roots = [
            Complex::new(0.5f64, 0.5),
            Complex::new(-0.25, 0.0),
            Complex::new(0.5, -0.5),
        ];
        let poly = poly_from_roots(&roots).unwrap();
        // (z^2 - z + 0.5)(z + 0.25)
        let expected = [1.0, -0.75, 0.25, 0.125];
        poly.iter()
            .zip(expected)
            .for_each(|(a, b)| assert_abs_diff_eq!(*a, b, epsilon = 1e-12));

        let unpaired = [Complex::new(0.1f64, 0.3)];
        assert!(poly_from_roots(&unpaired).is_err());
    }

    #[test]
    fn zpk2tf_applies_gain_to_numerator_only() {
        let zpk = ZpkFormatFilter::new(
            vec![Complex::new(-1.0f64, 0.0)],
            vec![Complex::new(0.5, 0.0)],
            3.0,
        );
        let ba = zpk2tf(&zpk).unwrap();
        assert_eq!(ba.b, vec![3.0, 3.0]);
        assert_eq!(ba.a, vec![1.0, -0.5]);
    }
}
