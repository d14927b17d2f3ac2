//! IIR filter synthesis from classical analog prototypes.
//!
//! A design runs in three stages: an analog lowpass prototype with unit
//! cutoff ([`buttap`], [`cheb1ap`]), a frequency transform to the bilinear
//! pre-warped cutoff ([`lp2lp_zpk`], [`lp2hp_zpk`]), and the bilinear map to
//! the z-plane ([`bilinear_zpk`]). Bandpass and bandstop responses combine a
//! lowpass and a highpass section with polynomial products.
//!
//! ```
//! use sigforge::signal::filter::design::{synthesize, FilterBandType, FilterDesign, FilterSpec};
//!
//! let spec = FilterSpec::new(FilterBandType::Lowpass, FilterDesign::Butterworth, 4, 1000.0, 8000.0);
//! let (ba, zpk) = synthesize(&spec).unwrap();
//! assert_eq!(ba.a.len(), 5);
//! assert_eq!(zpk.p.len(), 4);
//! ```

use core::fmt;
use nalgebra::{Complex, RealField};
use serde::{Deserialize, Serialize};
use sigforge_core::Result;

use crate::kernel::KernelLifecycle;
use crate::signal::traits::IirDesign;

mod kernels;
mod prototype;
mod relative_degree;
mod transform;

pub use kernels::*;
pub use prototype::*;
pub use transform::*;

pub(crate) use relative_degree::*;

/// Band type of a designed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterBandType {
    /// Pass frequencies below the cutoff.
    Lowpass,
    /// Pass frequencies above the cutoff.
    Highpass,
    /// Pass frequencies between the two band edges.
    Bandpass,
    /// Reject frequencies between the two band edges.
    Bandstop,
}

impl FilterBandType {
    /// Lowercase name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterBandType::Lowpass => "lowpass",
            FilterBandType::Highpass => "highpass",
            FilterBandType::Bandpass => "bandpass",
            FilterBandType::Bandstop => "bandstop",
        }
    }

    /// Whether the band needs both a lower and an upper edge.
    pub fn is_two_edged(&self) -> bool {
        matches!(self, FilterBandType::Bandpass | FilterBandType::Bandstop)
    }
}

impl fmt::Display for FilterBandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analog prototype family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterDesign {
    /// Maximally flat passband.
    #[serde(rename = "butterworth")]
    Butterworth,
    /// Equiripple passband with monotonic stopband.
    #[serde(rename = "chebyshev1", alias = "chebyshevI", alias = "chebyshev-i")]
    ChebyshevI,
    /// Lowpass only. Realized with the Chebyshev type I prototype at the same
    /// passband ripple; the stopband attenuation is validated but does not
    /// shape the response.
    #[serde(rename = "elliptic")]
    Elliptic,
}

impl FilterDesign {
    /// Lowercase name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterDesign::Butterworth => "butterworth",
            FilterDesign::ChebyshevI => "chebyshev1",
            FilterDesign::Elliptic => "elliptic",
        }
    }

    /// Whether this family has a formula for `band`.
    pub fn supports(&self, band: FilterBandType) -> bool {
        match self {
            FilterDesign::Butterworth => true,
            FilterDesign::ChebyshevI => !band.is_two_edged(),
            FilterDesign::Elliptic => band == FilterBandType::Lowpass,
        }
    }
}

impl fmt::Display for FilterDesign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the realized coefficients are scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GainNormalization {
    /// `a[0] == 1` and the passband has the prototype's gain.
    #[default]
    Unity,
    /// Every `b` and `a` coefficient of each section is divided by the sum of
    /// `|a_i|`. `H(z)` is unchanged but `a[0] != 1`, which the direct-form
    /// recursion does not compensate for.
    AbsoluteSum,
}

/// Transfer function `H(z) = B(z) / A(z)` with coefficients in powers of `z^-1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaFormatFilter<F> {
    /// Numerator coefficients.
    pub b: Vec<F>,
    /// Denominator coefficients.
    pub a: Vec<F>,
}

impl<F> BaFormatFilter<F> {
    /// Build from numerator and denominator.
    pub fn new(b: Vec<F>, a: Vec<F>) -> Self {
        Self { b, a }
    }
}

/// Zeros, poles and gain of a transfer function.
#[derive(Debug, Clone, PartialEq)]
pub struct ZpkFormatFilter<F>
where
    F: RealField + Copy,
{
    /// Zeros.
    pub z: Vec<Complex<F>>,
    /// Poles.
    pub p: Vec<Complex<F>>,
    /// System gain.
    pub k: F,
}

impl<F> ZpkFormatFilter<F>
where
    F: RealField + Copy,
{
    /// Build from zeros, poles and gain.
    pub fn new(z: Vec<Complex<F>>, p: Vec<Complex<F>>, k: F) -> Self {
        Self { z, p, k }
    }
}

/// A filter request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec<F> {
    /// Band type.
    pub band: FilterBandType,
    /// Prototype family.
    pub design: FilterDesign,
    /// Prototype order, at least 1.
    pub order: usize,
    /// Cutoff in Hz, or the lower band edge for two-edged bands.
    pub low_cutoff: F,
    /// Upper band edge in Hz; required for bandpass and bandstop.
    pub high_cutoff: Option<F>,
    /// Passband ripple in dB, used by Chebyshev and elliptic designs.
    pub passband_ripple: F,
    /// Stopband attenuation in dB, validated for elliptic designs.
    pub stopband_attenuation: F,
    /// Sample rate in Hz.
    pub sample_rate: F,
    /// Coefficient scaling.
    #[serde(default)]
    pub normalization: GainNormalization,
}

impl<F> FilterSpec<F>
where
    F: RealField + Copy,
{
    /// Single-edge spec with 0.5 dB ripple and 40 dB attenuation.
    pub fn new(
        band: FilterBandType,
        design: FilterDesign,
        order: usize,
        cutoff: F,
        sample_rate: F,
    ) -> Self {
        Self {
            band,
            design,
            order,
            low_cutoff: cutoff,
            high_cutoff: None,
            passband_ripple: nalgebra::convert(0.5),
            stopband_attenuation: nalgebra::convert(40.0),
            sample_rate,
            normalization: GainNormalization::Unity,
        }
    }

    /// Set the upper band edge.
    pub fn with_high_cutoff(mut self, high_cutoff: F) -> Self {
        self.high_cutoff = Some(high_cutoff);
        self
    }

    /// Set the passband ripple in dB.
    pub fn with_ripple(mut self, ripple: F) -> Self {
        self.passband_ripple = ripple;
        self
    }

    /// Set the stopband attenuation in dB.
    pub fn with_attenuation(mut self, attenuation: F) -> Self {
        self.stopband_attenuation = attenuation;
        self
    }

    /// Set the coefficient scaling.
    pub fn with_normalization(mut self, normalization: GainNormalization) -> Self {
        self.normalization = normalization;
        self
    }
}

/// Design a digital IIR filter.
///
/// Returns the realized coefficients together with the z-plane zeros, poles
/// and gain they were built from.
///
/// # Errors
/// * [`sigforge_core::Error::UnsupportedCombination`] when the design family
///   has no formula for the band type.
/// * [`sigforge_core::Error::InvalidSpec`] when the order is 0 or a band edge
///   lies outside `(0, sample_rate / 2)`.
pub fn synthesize<F>(spec: &FilterSpec<F>) -> Result<(BaFormatFilter<F>, ZpkFormatFilter<F>)>
where
    F: RealField + Copy,
{
    let kernel = IirFilterKernel::try_new(spec.clone())?;
    Ok(kernel.run_alloc()?)
}
