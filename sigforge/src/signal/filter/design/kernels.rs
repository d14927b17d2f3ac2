//! Trait-first kernel for IIR filter synthesis.

use nalgebra::RealField;
use sigforge_core::num_rs::polymul;
use tracing::{debug, warn};

use super::{
    bilinear_zpk, buttap, cheb1ap, lp2hp_zpk, lp2lp_zpk, zpk2tf, BaFormatFilter, FilterBandType,
    FilterDesign, FilterSpec, GainNormalization, ZpkFormatFilter,
};
use crate::complex::{cdiv, from_polar, magnitude, polyval_inv};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::linalg::roots;
use crate::signal::traits::IirDesign;

/// Sample rate of the bilinear map once band edges are expressed as a
/// fraction of Nyquist.
const BILINEAR_FS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Lowpass,
    Highpass,
}

/// Trait-first IIR design kernel.
///
/// Construction validates the whole [`FilterSpec`]; running it cannot fail on
/// user input, only on numerical breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct IirFilterKernel<F>
where
    F: RealField + Copy,
{
    spec: FilterSpec<F>,
}

impl<F> IirFilterKernel<F>
where
    F: RealField + Copy,
{
    /// The validated spec.
    pub fn spec(&self) -> &FilterSpec<F> {
        &self.spec
    }

    fn nyquist(&self) -> F {
        self.spec.sample_rate / nalgebra::convert(2.0)
    }

    /// Pre-warped analog cutoff for a band edge in Hz.
    fn warp(&self, cutoff: F) -> F {
        let wn = cutoff / self.nyquist();
        (F::pi() * wn / nalgebra::convert(2.0)).tan()
    }

    fn prototype(&self) -> ZpkFormatFilter<F> {
        match self.spec.design {
            FilterDesign::Butterworth => buttap(self.spec.order),
            FilterDesign::ChebyshevI | FilterDesign::Elliptic => {
                cheb1ap(self.spec.order, self.spec.passband_ripple)
            }
        }
    }

    /// One lowpass or highpass section at `cutoff` Hz.
    fn section(
        &self,
        kind: Section,
        cutoff: F,
    ) -> Result<(BaFormatFilter<F>, ZpkFormatFilter<F>), ExecInvariantViolation> {
        let warped = self.warp(cutoff);
        let analog = match kind {
            Section::Lowpass => lp2lp_zpk(self.prototype(), warped)?,
            Section::Highpass => lp2hp_zpk(self.prototype(), warped)?,
        };
        let zpk = bilinear_zpk(analog, nalgebra::convert(BILINEAR_FS))?;
        let mut ba = zpk2tf(&zpk)?;

        if ba.b.iter().chain(&ba.a).any(|c| !c.is_finite()) {
            return Err(ExecInvariantViolation::Degenerate {
                frequency: to_f64(cutoff),
            });
        }
        if self.spec.normalization == GainNormalization::AbsoluteSum {
            let sum = ba.a.iter().fold(F::zero(), |acc, c| acc + c.abs());
            ba.b.iter_mut().for_each(|c| *c /= sum);
            ba.a.iter_mut().for_each(|c| *c /= sum);
        }
        Ok((ba, zpk))
    }

    fn high_edge(&self) -> Result<F, ExecInvariantViolation> {
        self.spec
            .high_cutoff
            .ok_or(ExecInvariantViolation::InvalidState {
                reason: "two-edged band without an upper edge",
            })
    }

    /// Lowpass at the upper edge cascaded with highpass at the lower edge.
    fn bandpass(&self) -> Result<(BaFormatFilter<F>, ZpkFormatFilter<F>), ExecInvariantViolation> {
        let high = self.high_edge()?;
        let (lp, lp_zpk) = self.section(Section::Lowpass, high)?;
        let (hp, hp_zpk) = self.section(Section::Highpass, self.spec.low_cutoff)?;

        let mut b = product(&lp.b, &hp.b)?;
        let a = product(&lp.a, &hp.a)?;
        let mut k = lp_zpk.k * hp_zpk.k;

        if self.spec.normalization == GainNormalization::Unity {
            // Geometric centre of the analog band, mapped back to the z-plane.
            let centre = (self.warp(self.spec.low_cutoff) * self.warp(high)).sqrt();
            let w0 = centre.atan() * nalgebra::convert(2.0);
            let z0 = from_polar(F::one(), w0);
            let peak = magnitude(cdiv(polyval_inv(&b, z0), polyval_inv(&a, z0)));
            if !(peak > F::zero()) || !peak.is_finite() {
                return Err(ExecInvariantViolation::Degenerate {
                    frequency: to_f64(w0 * self.nyquist() / F::pi()),
                });
            }
            b.iter_mut().for_each(|c| *c /= peak);
            k /= peak;
        }

        let z = lp_zpk.z.into_iter().chain(hp_zpk.z).collect();
        let p = lp_zpk.p.into_iter().chain(hp_zpk.p).collect();
        Ok((BaFormatFilter::new(b, a), ZpkFormatFilter::new(z, p, k)))
    }

    /// Lowpass at the lower edge combined with highpass at the upper edge.
    ///
    /// Unity-gain designs add the sections in parallel so both passbands
    /// keep 0 dB. Absolute-sum designs cascade the already scaled sections,
    /// convolving numerators and denominators.
    fn bandstop(&self) -> Result<(BaFormatFilter<F>, ZpkFormatFilter<F>), ExecInvariantViolation> {
        let high = self.high_edge()?;
        let (lp, lp_zpk) = self.section(Section::Lowpass, self.spec.low_cutoff)?;
        let (hp, hp_zpk) = self.section(Section::Highpass, high)?;

        if self.spec.normalization == GainNormalization::AbsoluteSum {
            let b = product(&lp.b, &hp.b)?;
            let a = product(&lp.a, &hp.a)?;
            let z = lp_zpk.z.into_iter().chain(hp_zpk.z).collect();
            let p = lp_zpk.p.into_iter().chain(hp_zpk.p).collect();
            let k = lp_zpk.k * hp_zpk.k;
            return Ok((BaFormatFilter::new(b, a), ZpkFormatFilter::new(z, p, k)));
        }

        let left = product(&lp.b, &hp.a)?;
        let right = product(&hp.b, &lp.a)?;
        let b = left
            .iter()
            .zip(&right)
            .map(|(l, r)| *l + *r)
            .collect::<Vec<_>>();
        let a = product(&lp.a, &hp.a)?;

        // The sum of two sections has new zeros; recover them from `b`.
        let z = roots(&b)?;
        let p = lp_zpk.p.into_iter().chain(hp_zpk.p).collect();
        let k = b[0] / a[0];
        Ok((BaFormatFilter::new(b, a), ZpkFormatFilter::new(z, p, k)))
    }
}

fn product<F>(p: &[F], q: &[F]) -> Result<Vec<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    polymul(p, q).map_err(|_| ExecInvariantViolation::InvalidState {
        reason: "section coefficients are empty",
    })
}

fn to_f64<F>(x: F) -> f64
where
    F: RealField + Copy,
{
    nalgebra::try_convert::<F, f64>(x).unwrap_or(f64::NAN)
}

impl<F> KernelLifecycle for IirFilterKernel<F>
where
    F: RealField + Copy,
{
    type Config = FilterSpec<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if !config.design.supports(config.band) {
            return Err(ConfigError::Unsupported {
                design: config.design.as_str(),
                band: config.band.as_str(),
            });
        }
        if config.order == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "order",
                reason: "order must be at least 1",
            });
        }
        if !(config.sample_rate > F::zero()) || !config.sample_rate.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "sample_rate",
                reason: "sample rate must be finite and > 0",
            });
        }

        let nyquist = config.sample_rate / nalgebra::convert(2.0);
        let inside = |f: F| f > F::zero() && f < nyquist;
        if !inside(config.low_cutoff) {
            return Err(ConfigError::InvalidArgument {
                arg: "low_cutoff",
                reason: "cutoff must lie strictly between 0 and the Nyquist frequency",
            });
        }
        if config.band.is_two_edged() {
            let Some(high) = config.high_cutoff else {
                return Err(ConfigError::InvalidArgument {
                    arg: "high_cutoff",
                    reason: "bandpass and bandstop need an upper band edge",
                });
            };
            if !inside(high) || high <= config.low_cutoff {
                return Err(ConfigError::InvalidArgument {
                    arg: "high_cutoff",
                    reason: "upper edge must lie between the lower edge and the Nyquist frequency",
                });
            }
        }

        let uses_ripple = matches!(
            config.design,
            FilterDesign::ChebyshevI | FilterDesign::Elliptic
        );
        if uses_ripple && (!(config.passband_ripple > F::zero()) || !config.passband_ripple.is_finite())
        {
            return Err(ConfigError::InvalidArgument {
                arg: "passband_ripple",
                reason: "passband ripple must be finite and > 0 dB",
            });
        }
        if config.design == FilterDesign::Elliptic
            && (!(config.stopband_attenuation > F::zero())
                || !config.stopband_attenuation.is_finite())
        {
            return Err(ConfigError::InvalidArgument {
                arg: "stopband_attenuation",
                reason: "stopband attenuation must be finite and > 0 dB",
            });
        }

        Ok(Self { spec: config })
    }
}

impl<F> IirDesign for IirFilterKernel<F>
where
    F: RealField + Copy,
{
    type Output = (BaFormatFilter<F>, ZpkFormatFilter<F>);

    fn run_alloc(&self) -> Result<Self::Output, ExecInvariantViolation> {
        let spec = &self.spec;
        if spec.design == FilterDesign::Elliptic {
            warn!(
                order = spec.order,
                "elliptic design realized with a Chebyshev type I prototype"
            );
        }

        let out = match spec.band {
            FilterBandType::Lowpass => self.section(Section::Lowpass, spec.low_cutoff)?,
            FilterBandType::Highpass => self.section(Section::Highpass, spec.low_cutoff)?,
            FilterBandType::Bandpass => self.bandpass()?,
            FilterBandType::Bandstop => self.bandstop()?,
        };

        debug!(
            design = %spec.design,
            band = %spec.band,
            order = spec.order,
            taps = out.0.a.len(),
            "synthesized filter"
        );
        Ok(out)
    }
}
