//! One-sided magnitude spectrum of a sampled signal.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use sigforge_core::Result;

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D};
use crate::signal::traits::Spectrum1D;
use crate::signal::wave::Signal;

/// Magnitude spectrum on the bins `k * fs / N`, `k = 0..=N/2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spectrum {
    /// Bin frequencies in Hz, ascending.
    pub frequencies: Vec<f64>,
    /// Single-sided amplitude per bin.
    pub magnitudes: Vec<f64>,
    /// Sample rate of the analysed signal.
    pub sample_rate: f64,
    /// Transform length.
    pub fft_len: usize,
}

impl Spectrum {
    /// Spacing between bins, `fs / N`.
    pub fn bin_width(&self) -> f64 {
        self.sample_rate / self.fft_len as f64
    }

    /// Frequency of the largest bin.
    pub fn peak_frequency(&self) -> Option<f64> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(core::cmp::Ordering::Equal))
            .map(|(k, _)| self.frequencies[k])
    }
}

fn fft_real(x: &[f64]) -> Vec<Complex<f64>> {
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(x.len());
    let mut buf = x.iter().map(|v| Complex::new(*v, 0.0)).collect::<Vec<_>>();
    fft.process(&mut buf);
    buf
}

/// Constructor config for [`SpectrumKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
}

/// Trait-first magnitude-spectrum kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumKernel {
    sample_rate: f64,
}

impl KernelLifecycle for SpectrumKernel {
    type Config = SpectrumConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if !(config.sample_rate > 0.0) || !config.sample_rate.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "sample_rate",
                reason: "sample rate must be finite and > 0",
            });
        }
        Ok(Self {
            sample_rate: config.sample_rate,
        })
    }
}

impl Spectrum1D<f64> for SpectrumKernel {
    type Output = Spectrum;

    fn run_alloc<I>(&self, input: &I) -> core::result::Result<Spectrum, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let x = input.read_slice()?;
        if x.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "signal" }.into());
        }
        let n = x.len();
        let spec = fft_real(x);
        let n_bins = n / 2 + 1;

        let magnitudes = spec[..n_bins]
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let unpaired = k == 0 || (n % 2 == 0 && k == n / 2);
                let scale = if unpaired { 1.0 } else { 2.0 };
                c.norm() * scale / n as f64
            })
            .collect();
        let frequencies = (0..n_bins)
            .map(|k| k as f64 * self.sample_rate / n as f64)
            .collect();

        Ok(Spectrum {
            frequencies,
            magnitudes,
            sample_rate: self.sample_rate,
            fft_len: n,
        })
    }
}

/// Magnitude spectrum of the whole signal.
///
/// # Errors
/// [`sigforge_core::Error::EmptyInput`] for an empty signal and
/// [`sigforge_core::Error::InvalidSpec`] for a non-positive sample rate.
pub fn magnitude_spectrum(signal: &Signal) -> Result<Spectrum> {
    let kernel = SpectrumKernel::try_new(SpectrumConfig {
        sample_rate: signal.sample_rate,
    })?;
    Ok(kernel.run_alloc(&signal.samples)?)
}
