use approx::assert_abs_diff_eq;
use sigforge::signal::filter::apply;
use sigforge::signal::filter::design::{
    synthesize, FilterBandType, FilterDesign, FilterSpec, GainNormalization,
};
use sigforge::signal::response::{frequency_response, impulse_response};
use sigforge::signal::spectral::magnitude_spectrum;
use sigforge::signal::wave::{generate, pink_noise, unit_impulse, white_noise, SignalSpec, Waveform};
use sigforge::Error;
use sigforge_core::num_rs::{convolve, ConvolveMode};

use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;

const FS: f64 = 8000.0;

fn lowpass(design: FilterDesign, order: usize) -> FilterSpec<f64> {
    FilterSpec::new(FilterBandType::Lowpass, design, order, 1000.0, FS)
}

#[test]
fn butterworth_lowpass_is_monic_with_order_plus_one_taps() {
    for order in 1..=10 {
        let (ba, _) = synthesize(&lowpass(FilterDesign::Butterworth, order)).unwrap();
        assert_eq!(ba.a.len(), order + 1);
        assert_eq!(ba.b.len(), order + 1);
        assert_abs_diff_eq!(ba.a[0], 1.0, epsilon = 1e-12);
    }
}

#[test]
fn impulse_response_is_apply_over_an_impulse() {
    let spec = FilterSpec::new(FilterBandType::Bandstop, FilterDesign::Butterworth, 3, 600.0, FS)
        .with_high_cutoff(2000.0);
    let (ba, _) = synthesize(&spec).unwrap();
    let probe = unit_impulse::<f64>(300, None).unwrap().to_vec();
    assert_eq!(apply(&ba, &probe).unwrap(), impulse_response(&ba, 300).unwrap());
}

#[test]
fn lowpass_dc_gain_within_one_db() {
    for design in [FilterDesign::Butterworth, FilterDesign::ChebyshevI, FilterDesign::Elliptic] {
        for order in 1..=8 {
            let (ba, _) = synthesize(&lowpass(design, order)).unwrap();
            let fr = frequency_response(&ba, FS, 1000).unwrap();
            assert!(
                fr.magnitudes[0].abs() <= 1.0,
                "{design} order {order}: {} dB",
                fr.magnitudes[0]
            );
        }
    }
}

#[test]
fn sine_spectrum_peaks_within_one_bin() {
    for frequency in [50.0, 440.0, 1234.5, 3900.0] {
        let signal = generate(&SignalSpec::new(Waveform::Sine, frequency, 0.25, FS)).unwrap();
        let spectrum = magnitude_spectrum(&signal).unwrap();
        let peak = spectrum.peak_frequency().unwrap();
        assert!(
            (peak - frequency).abs() <= spectrum.bin_width(),
            "{frequency} Hz peaked at {peak} Hz"
        );
    }
}

#[test]
fn reference_sine() {
    let signal = generate(&SignalSpec::new(Waveform::Sine, 1000.0, 1.0, FS)).unwrap();
    assert_eq!(signal.len(), 8000);
    assert_abs_diff_eq!(signal.samples[0], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(signal.samples[2], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(signal.samples[2000], 0.0, epsilon = 1e-9);
}

#[test]
fn convolve_reference_pair() {
    let got = convolve(array![1.0, 2.0].view(), array![1.0, 1.0].view(), ConvolveMode::Full).unwrap();
    assert_eq!(got, array![1.0, 3.0, 2.0]);
}

#[test]
fn pink_noise_is_narrower_than_white() {
    const LEN: usize = 100_000;
    let white = white_noise(&mut StdRng::seed_from_u64(11), LEN, 1.0);
    let pink = pink_noise(&mut StdRng::seed_from_u64(11), LEN, 1.0);
    let ptp = |x: &[f64]| {
        x.iter().cloned().fold(f64::MIN, f64::max) - x.iter().cloned().fold(f64::MAX, f64::min)
    };
    assert!(ptp(&pink) < ptp(&white));
}

#[test]
fn rejected_inputs() {
    let (ba, _) = synthesize(&lowpass(FilterDesign::Butterworth, 2)).unwrap();
    assert_eq!(apply(&ba, &[]).unwrap_err(), Error::EmptyInput { arg: "x".into() });

    assert!(matches!(
        synthesize(&lowpass(FilterDesign::Butterworth, 0)),
        Err(Error::InvalidSpec { ref field, .. }) if field == "order"
    ));

    let spec = FilterSpec::new(FilterBandType::Bandpass, FilterDesign::Elliptic, 4, 500.0, FS)
        .with_high_cutoff(1500.0);
    assert!(matches!(
        synthesize(&spec),
        Err(Error::UnsupportedCombination { .. })
    ));
}

#[test]
fn highpass_passes_nyquist_and_blocks_dc() {
    let spec = FilterSpec::new(FilterBandType::Highpass, FilterDesign::Butterworth, 4, 1000.0, FS);
    let (ba, _) = synthesize(&spec).unwrap();
    let fr = frequency_response(&ba, FS, 1000).unwrap();
    assert_abs_diff_eq!(*fr.magnitudes.last().unwrap(), 0.0, epsilon = 1e-3);
    assert!(fr.magnitudes[0] < -100.0);
}

#[test]
fn bandpass_centre_beats_far_edges() {
    let spec = FilterSpec::new(FilterBandType::Bandpass, FilterDesign::Butterworth, 3, 800.0, FS)
        .with_high_cutoff(1600.0);
    let (ba, _) = synthesize(&spec).unwrap();
    let fr = frequency_response(&ba, FS, 1000).unwrap();
    let at = |hz: f64| {
        let i = fr
            .frequencies
            .iter()
            .position(|f| *f >= hz)
            .unwrap();
        fr.magnitudes[i]
    };
    let centre = at(1150.0);
    assert!(centre > at(50.0) + 40.0);
    assert!(centre > at(3900.0) + 40.0);
}

#[test]
fn stable_designs_keep_poles_inside_unit_circle() {
    for band in [
        FilterBandType::Lowpass,
        FilterBandType::Highpass,
        FilterBandType::Bandpass,
        FilterBandType::Bandstop,
    ] {
        for order in [1, 2, 5, 8] {
            let spec = FilterSpec::new(band, FilterDesign::Butterworth, order, 500.0, FS)
                .with_high_cutoff(2500.0);
            let (_, zpk) = synthesize(&spec).unwrap();
            zpk.p
                .iter()
                .for_each(|p| assert!(p.norm() < 1.0, "{band} order {order}: |p| = {}", p.norm()));
        }
    }
}

#[test]
fn absolute_sum_normalization() {
    let spec = lowpass(FilterDesign::Butterworth, 3).with_normalization(GainNormalization::AbsoluteSum);
    let (ba, _) = synthesize(&spec).unwrap();
    assert_abs_diff_eq!(ba.a.iter().map(|c| c.abs()).sum::<f64>(), 1.0, epsilon = 1e-12);
}
