//! Frequency and time-domain analysis of designed filters.
//!
//! Everything here works on `f64` coefficients, the precision the filter
//! designer hands out over the wire.

use core::f64::consts::PI;

use nalgebra::Complex;
use serde::{Deserialize, Serialize};
use sigforge_core::{Error, Result};
use tracing::warn;

use crate::complex::{argument, cdiv, magnitude, polyval_inv};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::signal::filter::{apply, design::BaFormatFilter};
use crate::signal::traits::FreqResponse;
use crate::signal::wave::{unit_impulse, unit_step};

/// First frequency of the analysis grid in Hz.
pub const GRID_START_HZ: f64 = 1.0;

/// `H(e^{jw})` sampled on an ascending frequency grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyResponse {
    /// Frequencies in Hz.
    pub frequencies: Vec<f64>,
    /// `20 log10 |H|` in dB.
    pub magnitudes: Vec<f64>,
    /// `arg H` in degrees on `(-180, 180]`.
    pub phases: Vec<f64>,
}

impl FrequencyResponse {
    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Constructor config for [`FreqzKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreqzConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Grid resolution: the step is `sample_rate / (2 * num_points)`.
    pub num_points: usize,
}

/// Trait-first frequency response kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreqzKernel {
    sample_rate: f64,
    num_points: usize,
}

impl FreqzKernel {
    /// Grid `1 + i * fs / (2 * num_points)` Hz, up to and including Nyquist.
    pub fn grid(&self) -> Vec<f64> {
        let nyquist = self.sample_rate / 2.0;
        let step = nyquist / self.num_points as f64;
        (0..)
            .map(|i| GRID_START_HZ + i as f64 * step)
            .take_while(|f| *f <= nyquist)
            .collect()
    }
}

impl KernelLifecycle for FreqzKernel {
    type Config = FreqzConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if config.num_points == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "num_points",
                reason: "num_points must be > 0",
            });
        }
        if !(config.sample_rate > 0.0) || !config.sample_rate.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "sample_rate",
                reason: "sample rate must be finite and > 0",
            });
        }
        Ok(Self {
            sample_rate: config.sample_rate,
            num_points: config.num_points,
        })
    }
}

impl FreqResponse<f64> for FreqzKernel {
    type Output = FrequencyResponse;

    fn run_alloc(
        &self,
        b: &[f64],
        a: &[f64],
    ) -> core::result::Result<FrequencyResponse, ExecInvariantViolation> {
        if b.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "b" }.into());
        }
        if a.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "a" }.into());
        }

        let frequencies = self.grid();
        let mut magnitudes = Vec::with_capacity(frequencies.len());
        let mut phases = Vec::with_capacity(frequencies.len());
        let mut clamped = 0usize;

        for &f in &frequencies {
            let w = 2.0 * PI * f / self.sample_rate;
            let z = Complex::new(w.cos(), w.sin());
            let den = polyval_inv(a, z);
            if den.re == 0.0 && den.im == 0.0 {
                return Err(ExecInvariantViolation::Degenerate { frequency: f });
            }
            let h = cdiv(polyval_inv(b, z), den);

            let mag = magnitude(h);
            if mag < f64::MIN_POSITIVE {
                clamped += 1;
            }
            magnitudes.push(20.0 * mag.max(f64::MIN_POSITIVE).log10());
            phases.push(argument(h).to_degrees());
        }

        if clamped > 0 {
            warn!(clamped, "frequency response has exact nulls; magnitude floored");
        }
        Ok(FrequencyResponse {
            frequencies,
            magnitudes,
            phases,
        })
    }
}

/// Sample the frequency response of `coeffs`.
///
/// # Errors
/// * [`Error::DegenerateFilter`] if the denominator vanishes at a grid point.
/// * [`Error::InvalidSpec`] if `num_points` is 0 or `sample_rate` is not
///   positive.
/// * [`Error::EmptyInput`] if `b` or `a` is empty.
pub fn frequency_response(
    coeffs: &BaFormatFilter<f64>,
    sample_rate: f64,
    num_points: usize,
) -> Result<FrequencyResponse> {
    let kernel = FreqzKernel::try_new(FreqzConfig {
        sample_rate,
        num_points,
    })?;
    Ok(kernel.run_alloc(&coeffs.b, &coeffs.a)?)
}

/// Continuous phase in radians from wrapped phases in degrees.
fn unwrap_radians(phases_deg: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phases_deg.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    for p in phases_deg.iter().map(|d| d.to_radians()) {
        if let Some(prev) = prev {
            let jump = p - prev;
            if jump > PI {
                offset -= 2.0 * PI;
            } else if jump < -PI {
                offset += 2.0 * PI;
            }
        }
        prev = Some(p);
        out.push(p + offset);
    }
    out
}

/// Central-difference group delay.
///
/// For each interior index `i`,
/// `delay[i] = -(phi[i+1] - phi[i-1]) / (2 pi (f[i+1] - f[i]))` with the
/// phase unwrapped and in radians. Returns `frequencies[1..len-1]` alongside
/// the delays.
///
/// # Errors
/// * [`Error::EmptyInput`] with fewer than three points.
/// * [`Error::InvalidSpec`] if the inputs differ in length.
pub fn group_delay(frequencies: &[f64], phases_deg: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if frequencies.len() != phases_deg.len() {
        return Err(Error::invalid_spec(
            "phases",
            format!(
                "expected {} phases, got {}",
                frequencies.len(),
                phases_deg.len()
            ),
        ));
    }
    if frequencies.len() < 3 {
        return Err(Error::empty_input("frequencies"));
    }

    let phi = unwrap_radians(phases_deg);
    let n = frequencies.len();
    let delays = (1..n - 1)
        .map(|i| -(phi[i + 1] - phi[i - 1]) / (2.0 * PI * (frequencies[i + 1] - frequencies[i])))
        .collect();
    Ok((frequencies[1..n - 1].to_vec(), delays))
}

/// [`group_delay`] expressed in samples.
///
/// The central difference spans two grid steps, so the delay in samples is
/// `delay * sample_rate / 2`.
pub fn group_delay_samples(
    frequencies: &[f64],
    phases_deg: &[f64],
    sample_rate: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let (f, delays) = group_delay(frequencies, phases_deg)?;
    Ok((f, delays.into_iter().map(|d| d * sample_rate / 2.0).collect()))
}

/// First `len` samples of the response to a unit impulse.
pub fn impulse_response(coeffs: &BaFormatFilter<f64>, len: usize) -> Result<Vec<f64>> {
    let probe = unit_impulse::<f64>(len, None)?;
    apply(coeffs, &probe.to_vec())
}

/// First `len` samples of the response to a unit step.
pub fn step_response(coeffs: &BaFormatFilter<f64>, len: usize) -> Result<Vec<f64>> {
    let probe = unit_step::<f64>(len)?;
    apply(coeffs, &probe.to_vec())
}

/// Time-domain view of a filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeResponse {
    /// Impulse response.
    pub impulse: Vec<f64>,
    /// Step response.
    pub step: Vec<f64>,
    /// Group delay in samples.
    #[serde(rename = "groupDelay")]
    pub group_delay: Vec<f64>,
    /// Frequencies matching `group_delay`.
    #[serde(rename = "groupDelayFreq")]
    pub group_delay_frequencies: Vec<f64>,
}

/// Impulse, step and group delay of `coeffs` in one bundle.
///
/// The group delay is derived from `response`, which should have been
/// sampled at the same `sample_rate`. Grids of fewer than three points have
/// no interior point to difference around, so both group delay vectors come
/// back empty.
pub fn time_response(
    coeffs: &BaFormatFilter<f64>,
    len: usize,
    sample_rate: f64,
    response: &FrequencyResponse,
) -> Result<TimeResponse> {
    let (group_delay_frequencies, group_delay) = if response.len() < 3 {
        (Vec::new(), Vec::new())
    } else {
        group_delay_samples(&response.frequencies, &response.phases, sample_rate)?
    };
    Ok(TimeResponse {
        impulse: impulse_response(coeffs, len)?,
        step: step_response(coeffs, len)?,
        group_delay,
        group_delay_frequencies,
    })
}
