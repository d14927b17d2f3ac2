//! Serializable request and response records.
//!
//! These are the shapes exchanged with transport and presentation layers.
//! Field names are camelCase on the wire; frequencies ascend and samples are
//! chronological.

use nalgebra::Complex;
use serde::{Deserialize, Serialize};
use sigforge_core::{Error, Result};
use tracing::debug;

use crate::signal::filter::apply;
use crate::signal::filter::design::{
    synthesize, BaFormatFilter, FilterBandType, FilterDesign, FilterSpec, GainNormalization,
};
use crate::signal::response::{frequency_response, time_response, FrequencyResponse, TimeResponse};
use crate::signal::wave::{generate, SignalSpec};

fn default_ripple() -> f64 {
    0.5
}

fn default_attenuation() -> f64 {
    40.0
}

fn default_num_points() -> usize {
    1000
}

fn default_response_length() -> usize {
    100
}

/// Filter design parameters plus how densely to analyse the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDesignRequest {
    /// Band type.
    #[serde(rename = "type")]
    pub band: FilterBandType,
    /// Prototype family.
    pub design_method: FilterDesign,
    /// Cutoff, or lower band edge, in Hz.
    pub low_cutoff: f64,
    /// Upper band edge in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_cutoff: Option<f64>,
    /// Prototype order.
    pub order: usize,
    /// Passband ripple in dB.
    #[serde(default = "default_ripple")]
    pub ripple: f64,
    /// Stopband attenuation in dB.
    #[serde(default = "default_attenuation")]
    pub stopband_attenuation: f64,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Frequency grid resolution.
    #[serde(default = "default_num_points")]
    pub num_points: usize,
    /// Length of the impulse and step responses.
    #[serde(default = "default_response_length")]
    pub response_length: usize,
    /// Coefficient scaling.
    #[serde(default)]
    pub normalization: GainNormalization,
}

impl FilterDesignRequest {
    /// Request with the default ripple, attenuation and analysis sizes.
    pub fn new(
        band: FilterBandType,
        design_method: FilterDesign,
        order: usize,
        low_cutoff: f64,
        sample_rate: f64,
    ) -> Self {
        Self {
            band,
            design_method,
            low_cutoff,
            high_cutoff: None,
            order,
            ripple: default_ripple(),
            stopband_attenuation: default_attenuation(),
            sample_rate,
            num_points: default_num_points(),
            response_length: default_response_length(),
            normalization: GainNormalization::default(),
        }
    }

    /// Set the upper band edge.
    pub fn with_high_cutoff(mut self, high_cutoff: f64) -> Self {
        self.high_cutoff = Some(high_cutoff);
        self
    }

    /// The synthesis part of the request.
    pub fn spec(&self) -> FilterSpec<f64> {
        let spec = FilterSpec::new(
            self.band,
            self.design_method,
            self.order,
            self.low_cutoff,
            self.sample_rate,
        )
        .with_ripple(self.ripple)
        .with_attenuation(self.stopband_attenuation)
        .with_normalization(self.normalization);
        match self.high_cutoff {
            Some(high) => spec.with_high_cutoff(high),
            None => spec,
        }
    }
}

/// A z-plane point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexPoint {
    /// Real part.
    pub real: f64,
    /// Imaginary part.
    pub imag: f64,
}

impl From<Complex<f64>> for ComplexPoint {
    fn from(value: Complex<f64>) -> Self {
        Self {
            real: value.re,
            imag: value.im,
        }
    }
}

/// A designed filter and everything measured about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDesignResponse {
    /// Realized transfer function.
    pub coefficients: BaFormatFilter<f64>,
    /// z-plane poles.
    pub poles: Vec<ComplexPoint>,
    /// z-plane zeros.
    pub zeros: Vec<ComplexPoint>,
    /// Gain of the zero/pole factorization.
    pub gain: f64,
    /// Magnitude and phase over the analysis grid.
    pub frequency_response: FrequencyResponse,
    /// Impulse, step and group delay.
    pub time_response: TimeResponse,
}

/// Design a filter and analyse it.
///
/// A grid shorter than three points yields an empty group delay.
///
/// # Errors
/// Whatever [`synthesize`], [`frequency_response`] or [`time_response`]
/// reject.
pub fn design_filter(request: &FilterDesignRequest) -> Result<FilterDesignResponse> {
    let (coefficients, zpk) = synthesize(&request.spec())?;
    let frequency_response =
        frequency_response(&coefficients, request.sample_rate, request.num_points)?;
    let time_response = time_response(
        &coefficients,
        request.response_length,
        request.sample_rate,
        &frequency_response,
    )?;
    debug!(
        band = %request.band,
        design = %request.design_method,
        grid = frequency_response.len(),
        "designed filter"
    );
    Ok(FilterDesignResponse {
        coefficients,
        poles: zpk.p.into_iter().map(ComplexPoint::from).collect(),
        zeros: zpk.z.into_iter().map(ComplexPoint::from).collect(),
        gain: zpk.k,
        frequency_response,
        time_response,
    })
}

/// Signal generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRequest {
    /// Generator parameters, flattened onto the request.
    #[serde(flatten)]
    pub spec: SignalSpec,
}

impl From<SignalSpec> for SignalRequest {
    fn from(spec: SignalSpec) -> Self {
        Self { spec }
    }
}

/// Generated samples with their time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResponse {
    /// Samples.
    pub signal: Vec<f64>,
    /// Sample times in seconds.
    pub time: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Duration in seconds.
    pub duration: f64,
}

/// Generate a signal.
pub fn generate_signal(request: &SignalRequest) -> Result<SignalResponse> {
    let signal = generate(&request.spec)?;
    let time = signal.time();
    Ok(SignalResponse {
        signal: signal.samples,
        time,
        sample_rate: signal.sample_rate,
        duration: signal.duration,
    })
}

/// Filter caller samples with known coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterApplyRequest {
    /// Transfer function to run.
    pub coefficients: BaFormatFilter<f64>,
    /// Input samples.
    pub signal: Vec<f64>,
    /// Sample rate in Hz, echoed back.
    pub sample_rate: f64,
}

/// Filtered samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterApplyResponse {
    /// Output samples, same length as the input.
    pub signal: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: f64,
}

/// Run the request's filter over its signal.
///
/// # Errors
/// * [`Error::EmptyInput`] for an empty signal or empty coefficients.
/// * [`Error::InvalidSpec`] for a non-positive sample rate.
pub fn apply_filter(request: &FilterApplyRequest) -> Result<FilterApplyResponse> {
    if !(request.sample_rate > 0.0) || !request.sample_rate.is_finite() {
        return Err(Error::invalid_spec(
            "sample_rate",
            "sample rate must be finite and > 0",
        ));
    }
    Ok(FilterApplyResponse {
        signal: apply(&request.coefficients, &request.signal)?,
        sample_rate: request.sample_rate,
    })
}
