use core::f64::consts::PI;
use core::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SawtoothWaveConfig, SawtoothWaveKernel, SquareWaveConfig, SquareWaveKernel};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::signal::traits::{SawtoothWave1D, SignalGenerate, SquareWave1D};

/// Registers summed by the Voss-McCartney pink-noise generator.
pub const PINK_NOISE_REGISTERS: usize = 16;

/// Harmonics of the multitone waveform.
const MULTITONE_HARMONICS: [f64; 4] = [1.0, 2.0, 3.0, 5.0];

/// Absorbs representation error in `duration * sample_rate`, e.g. `0.29 * 100`.
const SAMPLE_COUNT_SLACK: f64 = 1e-9;

/// Largest buffer a single request may allocate.
pub const MAX_SAMPLES: usize = 1 << 27;

/// Waveform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// `A sin(2 pi f t + phi)`.
    Sine,
    /// `A cos(2 pi f t + phi)`.
    Cosine,
    /// `+A` where the sine is non-negative, `-A` elsewhere.
    Square,
    /// Rising ramp from `-A` to `A` once per period.
    Sawtooth,
    /// Symmetric ramp up and down once per period.
    Triangle,
    /// Linear sweep from `frequency` towards `modulation_frequency` over the duration.
    Chirp,
    /// Frequency modulation of the carrier by `modulation_index * sin(2 pi fmod t)`.
    Fm,
    /// Amplitude modulation: carrier times `1 + index * sin(2 pi fmod t)`.
    Am,
    /// Unipolar rectangular pulse train with 50% duty.
    Pulse,
    /// Equal-weight sum of harmonics 1, 2, 3 and 5.
    Multitone,
    /// Uniform white noise on `[-A, A)`.
    #[serde(alias = "noise")]
    WhiteNoise,
    /// Voss-McCartney pink noise.
    PinkNoise,
}

impl Waveform {
    /// Snake-case name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Cosine => "cosine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Chirp => "chirp",
            Waveform::Fm => "fm",
            Waveform::Am => "am",
            Waveform::Pulse => "pulse",
            Waveform::Multitone => "multitone",
            Waveform::WhiteNoise => "white_noise",
            Waveform::PinkNoise => "pink_noise",
        }
    }

    /// Whether the waveform draws from the random source.
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Waveform::WhiteNoise | Waveform::PinkNoise)
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_frequency() -> f64 {
    1000.0
}

fn default_one() -> f64 {
    1.0
}

fn default_sample_rate() -> f64 {
    44100.0
}

fn default_modulation_frequency() -> f64 {
    100.0
}

/// Parameters of a generated signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSpec {
    /// Waveform family.
    pub waveform: Waveform,
    /// Carrier frequency in Hz.
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    /// Peak amplitude after normalization.
    #[serde(default = "default_one")]
    pub amplitude: f64,
    /// Duration in seconds.
    #[serde(default = "default_one")]
    pub duration: f64,
    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
    /// Phase offset in radians.
    #[serde(default)]
    pub phase: f64,
    /// Modulating frequency in Hz; the end frequency of a chirp.
    #[serde(default = "default_modulation_frequency", alias = "modulationFreq")]
    pub modulation_frequency: f64,
    /// Modulation depth (AM) or deviation in Hz (FM).
    #[serde(default = "default_one")]
    pub modulation_index: f64,
    /// Peak of the uniform noise added to every sample.
    #[serde(default)]
    pub noise_level: f64,
    /// Seed for the random source; fresh entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SignalSpec {
    /// Unit-amplitude, zero-phase, noise-free spec.
    pub fn new(waveform: Waveform, frequency: f64, duration: f64, sample_rate: f64) -> Self {
        Self {
            waveform,
            frequency,
            amplitude: 1.0,
            duration,
            sample_rate,
            phase: 0.0,
            modulation_frequency: default_modulation_frequency(),
            modulation_index: 1.0,
            noise_level: 0.0,
            seed: None,
        }
    }

    /// Set the peak amplitude.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set the phase offset in radians.
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Set modulating frequency and index.
    pub fn with_modulation(mut self, frequency: f64, index: f64) -> Self {
        self.modulation_frequency = frequency;
        self.modulation_index = index;
        self
    }

    /// Set the additive noise level.
    pub fn with_noise(mut self, level: f64) -> Self {
        self.noise_level = level;
        self
    }

    /// Fix the random source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// `floor(duration * sample_rate)`.
    pub fn sample_count(&self) -> usize {
        // `as` saturates; non-finite products were rejected by validation.
        (self.duration * self.sample_rate + SAMPLE_COUNT_SLACK).floor() as usize
    }
}

/// Sampled signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Samples in chronological order.
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Nominal duration in seconds.
    pub duration: f64,
}

impl Signal {
    /// Wrap caller samples; the duration is derived from the length.
    pub fn from_samples(samples: Vec<f64>, sample_rate: f64) -> Self {
        let duration = samples.len() as f64 / sample_rate;
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Sample times `n / sample_rate`.
    pub fn time(&self) -> Vec<f64> {
        (0..self.samples.len())
            .map(|n| n as f64 / self.sample_rate)
            .collect()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest `|sample|`, `0` when empty.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0f64, |acc, s| acc.max(s.abs()))
    }
}

/// Trait-first signal generator.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalGeneratorKernel {
    spec: SignalSpec,
    len: usize,
}

impl SignalGeneratorKernel {
    /// Number of samples the kernel produces.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the kernel produces no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn rng(&self) -> StdRng {
        match self.spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn phases(&self, times: &[f64]) -> Vec<f64> {
        let s = &self.spec;
        times
            .iter()
            .map(|t| 2.0 * PI * s.frequency * t + s.phase)
            .collect()
    }

    fn deterministic(&self, times: &[f64]) -> Result<Vec<f64>, ExecInvariantViolation> {
        let s = &self.spec;
        let a = s.amplitude;
        let tone = |f: f64, t: f64| (2.0 * PI * f * t + s.phase).sin();
        let modulator = |t: f64| (2.0 * PI * s.modulation_frequency * t).sin();

        let out = match s.waveform {
            Waveform::Sine => times.iter().map(|t| a * tone(s.frequency, *t)).collect(),
            Waveform::Cosine => times
                .iter()
                .map(|t| a * (2.0 * PI * s.frequency * t + s.phase).cos())
                .collect(),
            Waveform::Square => {
                let kernel = SquareWaveKernel::try_new(SquareWaveConfig { duty: 0.5 })?;
                scale(kernel.run_alloc(&self.phases(times))?, a)
            }
            Waveform::Sawtooth | Waveform::Triangle => {
                let width = if s.waveform == Waveform::Sawtooth { 1.0 } else { 0.5 };
                let kernel = SawtoothWaveKernel::try_new(SawtoothWaveConfig { width })?;
                scale(kernel.run_alloc(&self.phases(times))?, a)
            }
            Waveform::Chirp => times
                .iter()
                .map(|t| {
                    let f = s.frequency + (s.modulation_frequency - s.frequency) * t / s.duration;
                    a * tone(f, *t)
                })
                .collect(),
            Waveform::Fm => times
                .iter()
                .map(|t| a * tone(s.frequency + s.modulation_index * modulator(*t), *t))
                .collect(),
            Waveform::Am => times
                .iter()
                .map(|t| a * tone(s.frequency, *t) * (1.0 + s.modulation_index * modulator(*t)))
                .collect(),
            Waveform::Pulse => {
                let period = 1.0 / s.frequency;
                times
                    .iter()
                    .map(|t| if (t % period) / period < 0.5 { a } else { 0.0 })
                    .collect()
            }
            Waveform::Multitone => {
                let weight = a / MULTITONE_HARMONICS.len() as f64;
                times
                    .iter()
                    .map(|t| {
                        MULTITONE_HARMONICS
                            .iter()
                            .map(|m| weight * tone(m * s.frequency, *t))
                            .sum()
                    })
                    .collect()
            }
            Waveform::WhiteNoise | Waveform::PinkNoise => {
                return Err(ExecInvariantViolation::InvalidState {
                    reason: "stochastic waveform routed to deterministic synthesis",
                })
            }
        };
        Ok(out)
    }
}

fn scale(mut samples: Vec<f64>, amplitude: f64) -> Vec<f64> {
    samples.iter_mut().for_each(|s| *s *= amplitude);
    samples
}

/// `len` samples of `amplitude * U(-1, 1)`.
pub fn white_noise<R: Rng + ?Sized>(rng: &mut R, len: usize, amplitude: f64) -> Vec<f64> {
    (0..len)
        .map(|_| amplitude * rng.random_range(-1.0..1.0))
        .collect()
}

/// Voss-McCartney pink noise.
///
/// Sample `n` refreshes register `n % 16` with a fresh `U(-1, 1)` draw and
/// emits the mean of all registers, scaled by `amplitude`.
pub fn pink_noise<R: Rng + ?Sized>(rng: &mut R, len: usize, amplitude: f64) -> Vec<f64> {
    let mut registers = [0.0f64; PINK_NOISE_REGISTERS];
    (0..len)
        .map(|n| {
            registers[n % PINK_NOISE_REGISTERS] = rng.random_range(-1.0..1.0);
            amplitude * registers.iter().sum::<f64>() / PINK_NOISE_REGISTERS as f64
        })
        .collect()
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidArgument {
            arg: field,
            reason: "value must be finite",
        })
    }
}

impl KernelLifecycle for SignalGeneratorKernel {
    type Config = SignalSpec;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if !(config.duration > 0.0) || !config.duration.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "duration",
                reason: "duration must be finite and > 0",
            });
        }
        if !(config.sample_rate > 0.0) || !config.sample_rate.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "sample_rate",
                reason: "sample rate must be finite and > 0",
            });
        }
        if !(config.duration * config.sample_rate <= MAX_SAMPLES as f64) {
            return Err(ConfigError::InvalidArgument {
                arg: "duration",
                reason: "duration * sample_rate exceeds the sample limit",
            });
        }
        finite("frequency", config.frequency)?;
        finite("amplitude", config.amplitude)?;
        if config.amplitude < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "amplitude",
                reason: "amplitude must be >= 0",
            });
        }
        finite("phase", config.phase)?;
        finite("modulation_frequency", config.modulation_frequency)?;
        finite("modulation_index", config.modulation_index)?;
        finite("noise_level", config.noise_level)?;

        let len = config.sample_count();
        Ok(Self { spec: config, len })
    }
}

impl SignalGenerate for SignalGeneratorKernel {
    type Output = Signal;

    fn run_alloc(&self) -> Result<Signal, ExecInvariantViolation> {
        let s = &self.spec;
        let times = (0..self.len)
            .map(|n| n as f64 / s.sample_rate)
            .collect::<Vec<_>>();

        let mut rng = self.rng();
        let mut samples = match s.waveform {
            Waveform::WhiteNoise => white_noise(&mut rng, self.len, s.amplitude),
            Waveform::PinkNoise => pink_noise(&mut rng, self.len, s.amplitude),
            _ => self.deterministic(&times)?,
        };

        if s.noise_level > 0.0 {
            samples
                .iter_mut()
                .for_each(|x| *x += s.noise_level * rng.random_range(-1.0..1.0));
        }

        let peak = samples.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        if peak > 0.0 && peak.is_finite() {
            samples.iter_mut().for_each(|x| *x = *x / peak * s.amplitude);
        }

        debug!(
            waveform = %s.waveform,
            samples = self.len,
            sample_rate = s.sample_rate,
            noise_level = s.noise_level,
            "generated signal"
        );
        Ok(Signal {
            samples,
            sample_rate: s.sample_rate,
            duration: s.duration,
        })
    }
}

/// Synthesize the signal described by `spec`.
///
/// `floor(duration * sample_rate)` samples are produced at `t_n = n /
/// sample_rate`. Optional uniform noise is added afterwards, then the whole
/// buffer is rescaled so that its peak magnitude equals `amplitude`.
///
/// # Errors
/// [`sigforge_core::Error::InvalidSpec`] when the duration or sample rate is
/// not a positive finite number, when their product exceeds [`MAX_SAMPLES`],
/// when the amplitude is negative, or when another parameter is not finite.
///
/// ```
/// use sigforge::signal::wave::{generate, SignalSpec, Waveform};
///
/// let spec = SignalSpec::new(Waveform::Sine, 1000.0, 1.0, 8000.0);
/// let signal = generate(&spec).unwrap();
/// assert_eq!(signal.len(), 8000);
/// assert!((signal.samples[2] - 1.0).abs() < 1e-12);
/// ```
pub fn generate(spec: &SignalSpec) -> sigforge_core::Result<Signal> {
    let kernel = SignalGeneratorKernel::try_new(spec.clone())?;
    Ok(kernel.run_alloc()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sigforge_core::Error;

    fn peak_to_peak(x: &[f64]) -> f64 {
        let max = x.iter().cloned().fold(f64::MIN, f64::max);
        let min = x.iter().cloned().fold(f64::MAX, f64::min);
        max - min
    }

    /// `raw` rescaled the way the generator rescales: peak magnitude to `amplitude`.
    fn normalized(raw: Vec<f64>, amplitude: f64) -> Vec<f64> {
        let peak = raw.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        raw.into_iter().map(|x| x / peak * amplitude).collect()
    }

    fn assert_samples_eq(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len());
        for (n, (g, w)) in got.iter().zip(want).enumerate() {
            assert!((g - w).abs() < 1e-9, "sample {n}: {g} != {w}");
        }
    }

    fn std_dev(x: &[f64]) -> f64 {
        let mean = x.iter().sum::<f64>() / x.len() as f64;
        (x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn sine_at_a_quarter_of_the_sample_rate() {
        let signal = generate(&SignalSpec::new(Waveform::Sine, 1000.0, 1.0, 8000.0)).unwrap();
        assert_eq!(signal.len(), 8000);
        assert_abs_diff_eq!(signal.samples[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(signal.samples[2], 1.0, epsilon = 1e-12);
        // 2000 samples are 250 whole periods.
        assert_abs_diff_eq!(signal.samples[2000], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.peak(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn sample_count_tolerates_representation_error() {
        let spec = SignalSpec::new(Waveform::Cosine, 5.0, 0.29, 100.0);
        assert_eq!(generate(&spec).unwrap().len(), 29);
        let spec = SignalSpec::new(Waveform::Cosine, 5.0, 0.015, 100.0);
        assert_eq!(generate(&spec).unwrap().len(), 1);
    }

    #[test]
    fn time_axis_is_n_over_fs() {
        let signal = generate(&SignalSpec::new(Waveform::Sine, 10.0, 0.01, 400.0)).unwrap();
        let t = signal.time();
        assert_eq!(t.len(), 4);
        assert_abs_diff_eq!(t[3], 3.0 / 400.0);
    }

    #[test]
    fn periodic_shapes_are_normalized_to_amplitude() {
        for waveform in [
            Waveform::Square,
            Waveform::Sawtooth,
            Waveform::Triangle,
            Waveform::Chirp,
            Waveform::Fm,
            Waveform::Am,
            Waveform::Multitone,
        ] {
            let spec = SignalSpec::new(waveform, 50.0, 0.5, 8000.0)
                .with_amplitude(2.5)
                .with_modulation(5.0, 0.5);
            let signal = generate(&spec).unwrap();
            assert_abs_diff_eq!(signal.peak(), 2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn square_and_pulse_take_two_levels() {
        let square = generate(&SignalSpec::new(Waveform::Square, 100.0, 0.1, 8000.0)).unwrap();
        assert!(square.samples.iter().all(|s| *s == 1.0 || *s == -1.0));
        assert_eq!(square.samples[0], 1.0);
        assert_eq!(square.samples[60], -1.0);

        let pulse = generate(&SignalSpec::new(Waveform::Pulse, 100.0, 0.1, 8000.0)).unwrap();
        assert!(pulse.samples.iter().all(|s| *s == 1.0 || *s == 0.0));
        assert_eq!(pulse.samples[10], 1.0);
        assert_eq!(pulse.samples[50], 0.0);
    }

    #[test]
    fn sawtooth_ramps_from_minus_one() {
        let ramp = generate(&SignalSpec::new(Waveform::Sawtooth, 1.0, 1.0, 8.0)).unwrap();
        assert_samples_eq(
            &ramp.samples,
            &[-1.0, -0.75, -0.5, -0.25, 0.0, 0.25, 0.5, 0.75],
        );

        // Half a period of phase lead starts the ramp at zero.
        let shifted = generate(&SignalSpec::new(Waveform::Sawtooth, 1.0, 1.0, 8.0).with_phase(PI))
            .unwrap();
        assert_abs_diff_eq!(shifted.samples[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(shifted.samples[4], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn triangle_rises_then_falls() {
        let tri = generate(&SignalSpec::new(Waveform::Triangle, 1.0, 1.0, 8.0)).unwrap();
        assert_samples_eq(
            &tri.samples,
            &[-1.0, -0.5, 0.0, 0.5, 1.0, 0.5, 0.0, -0.5],
        );
    }

    #[test]
    fn chirp_sweeps_linearly_over_the_duration() {
        let (f0, f1, duration, fs) = (100.0, 300.0, 0.25, 8000.0);
        let spec = SignalSpec::new(Waveform::Chirp, f0, duration, fs).with_modulation(f1, 0.0);
        let got = generate(&spec).unwrap();
        let raw = got
            .time()
            .iter()
            .map(|t| (2.0 * PI * (f0 + (f1 - f0) * t / duration) * t).sin())
            .collect();
        assert_samples_eq(&got.samples, &normalized(raw, 1.0));

        // Without a sweep it collapses to the plain tone.
        let flat = SignalSpec::new(Waveform::Chirp, f0, duration, fs).with_modulation(f0, 0.0);
        let sine = SignalSpec::new(Waveform::Sine, f0, duration, fs);
        assert_samples_eq(&generate(&flat).unwrap().samples, &generate(&sine).unwrap().samples);
    }

    #[test]
    fn fm_modulates_the_carrier_frequency() {
        let (fc, fm, index) = (200.0, 10.0, 5.0);
        let spec = SignalSpec::new(Waveform::Fm, fc, 0.2, 8000.0)
            .with_amplitude(0.5)
            .with_modulation(fm, index);
        let got = generate(&spec).unwrap();
        let raw = got
            .time()
            .iter()
            .map(|t| (2.0 * PI * (fc + index * (2.0 * PI * fm * t).sin()) * t).sin())
            .collect();
        assert_samples_eq(&got.samples, &normalized(raw, 0.5));
    }

    #[test]
    fn am_scales_the_carrier_envelope() {
        let spec = SignalSpec::new(Waveform::Am, 1000.0, 0.004, 8000.0).with_modulation(250.0, 0.5);
        let got = generate(&spec).unwrap();
        let raw = got
            .time()
            .iter()
            .map(|t| {
                (2.0 * PI * 1000.0 * t).sin() * (1.0 + 0.5 * (2.0 * PI * 250.0 * t).sin())
            })
            .collect();
        assert_samples_eq(&got.samples, &normalized(raw, 1.0));

        // Carrier crest at n = 10 meets the envelope crest 1 + 0.5 sin(5 pi / 8).
        let crest = 1.0 + 0.5 * (5.0 * PI / 8.0).sin();
        assert_abs_diff_eq!(got.samples[10], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            got.samples[2],
            (1.0 + 0.5 * (PI / 8.0).sin()) / crest,
            epsilon = 1e-12
        );
    }

    #[test]
    fn multitone_sums_equal_weight_harmonics() {
        let f = 50.0;
        let spec = SignalSpec::new(Waveform::Multitone, f, 0.1, 8000.0).with_amplitude(2.0);
        let got = generate(&spec).unwrap();
        let raw = got
            .time()
            .iter()
            .map(|t| {
                [1.0, 2.0, 3.0, 5.0]
                    .iter()
                    .map(|m| 0.25 * (2.0 * PI * m * f * t).sin())
                    .sum::<f64>()
            })
            .collect();
        assert_samples_eq(&got.samples, &normalized(raw, 2.0));
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let spec = SignalSpec::new(Waveform::WhiteNoise, 0.0, 0.1, 8000.0).with_seed(7);
        assert_eq!(generate(&spec).unwrap(), generate(&spec).unwrap());
        let other = generate(&spec.clone().with_seed(8)).unwrap();
        assert_ne!(generate(&spec).unwrap().samples, other.samples);

        let noisy = SignalSpec::new(Waveform::Sine, 100.0, 0.1, 8000.0)
            .with_noise(0.3)
            .with_seed(3);
        let noisy = generate(&noisy).unwrap();
        assert_abs_diff_eq!(noisy.peak(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pink_noise_is_narrower_than_white() {
        let mut rng = StdRng::seed_from_u64(11);
        let white = white_noise(&mut rng, 100_000, 1.0);
        let pink = pink_noise(&mut rng, 100_000, 1.0);
        assert!(peak_to_peak(&pink) < peak_to_peak(&white));

        let base = SignalSpec::new(Waveform::WhiteNoise, 0.0, 12.5, 8000.0).with_seed(5);
        let white = generate(&base).unwrap();
        let pink = generate(&SignalSpec {
            waveform: Waveform::PinkNoise,
            ..base
        })
        .unwrap();
        assert!(std_dev(&pink.samples) < std_dev(&white.samples));
    }

    #[test]
    fn invalid_timing_is_rejected() {
        let zero = SignalSpec::new(Waveform::Sine, 100.0, 0.0, 8000.0);
        assert!(matches!(
            generate(&zero),
            Err(Error::InvalidSpec { ref field, .. }) if field == "duration"
        ));
        let negative_fs = SignalSpec::new(Waveform::Sine, 100.0, 1.0, -1.0);
        assert!(matches!(
            generate(&negative_fs),
            Err(Error::InvalidSpec { ref field, .. }) if field == "sample_rate"
        ));
        let nan_amp = SignalSpec::new(Waveform::Sine, 100.0, 1.0, 8000.0).with_amplitude(f64::NAN);
        assert!(matches!(
            generate(&nan_amp),
            Err(Error::InvalidSpec { ref field, .. }) if field == "amplitude"
        ));
    }

    #[test]
    fn oversized_buffers_are_rejected() {
        let huge = SignalSpec::new(Waveform::Sine, 1.0, 1e300, 1.0);
        assert!(matches!(
            generate(&huge),
            Err(Error::InvalidSpec { ref field, .. }) if field == "duration"
        ));
        let overflowing = SignalSpec::new(Waveform::Sine, 1.0, 1e200, 1e200);
        assert!(matches!(
            generate(&overflowing),
            Err(Error::InvalidSpec { ref field, .. }) if field == "duration"
        ));
        let at_limit = SignalSpec::new(Waveform::Sine, 1.0, MAX_SAMPLES as f64 + 1.0, 1.0);
        assert!(SignalGeneratorKernel::try_new(at_limit).is_err());
    }

    #[test]
    fn negative_amplitude_is_rejected() {
        let negative = SignalSpec::new(Waveform::Sine, 100.0, 0.1, 8000.0).with_amplitude(-1.0);
        assert!(matches!(
            generate(&negative),
            Err(Error::InvalidSpec { ref field, .. }) if field == "amplitude"
        ));
        let silent = SignalSpec::new(Waveform::Sine, 100.0, 0.1, 8000.0).with_amplitude(0.0);
        assert!(generate(&silent).unwrap().samples.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn wire_names() {
        let spec: SignalSpec = serde_json::from_str(
            r#"{"waveform":"noise","frequency":10,"duration":0.5,"sampleRate":100,"modulationFreq":3}"#,
        )
        .unwrap();
        assert_eq!(spec.waveform, Waveform::WhiteNoise);
        assert_eq!(spec.modulation_frequency, 3.0);
        assert_eq!(spec.amplitude, 1.0);
        let pink: Waveform = serde_json::from_str(r#""pink_noise""#).unwrap();
        assert_eq!(pink, Waveform::PinkNoise);
        assert_eq!(serde_json::to_string(&Waveform::Fm).unwrap(), r#""fm""#);
    }
}
