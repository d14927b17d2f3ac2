use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sigforge::kernel::KernelLifecycle;
use sigforge::signal::filter::design::{synthesize, FilterBandType, FilterDesign, FilterSpec};
use sigforge::signal::filter::{LFilterConfig, LFilterKernel};
use sigforge::signal::traits::LFilter1D;

const SAMPLE_RATE: f64 = 44_100.0;

/// Sum of a few decaying sinusoids with random amplitude and phase.
fn randomized_signal(rng: &mut StdRng, num_freqs: usize, len: usize) -> Vec<f64> {
    let tones: Vec<(f64, f64, f64)> = (0..num_freqs)
        .map(|i| {
            let amplitude = rng.random_range(0.5..1.5) / 1.1f64.powi(i as i32);
            let freq = rng.random_range(20.0..SAMPLE_RATE / 2.0);
            let phase = rng.random_range(0.0..std::f64::consts::PI);
            (amplitude, freq, phase)
        })
        .collect();
    (0..len)
        .map(|n| {
            let t = n as f64 / SAMPLE_RATE;
            tones
                .iter()
                .map(|(a, f, p)| a * (2.0 * std::f64::consts::PI * f * t + p).sin())
                .sum()
        })
        .collect()
}

/// Butterworth bandpass of increasing order over 2^16 samples.
fn apply_bandpass(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let signal = randomized_signal(&mut rng, 14, 1 << 16);

    let mut group = c.benchmark_group("apply_bandpass");
    for order in [2usize, 4, 8] {
        let spec = FilterSpec::new(
            FilterBandType::Bandpass,
            FilterDesign::Butterworth,
            order,
            300.0,
            SAMPLE_RATE,
        )
        .with_high_cutoff(3400.0);
        let (ba, _) = synthesize(&spec).expect("bandpass design should be valid");
        let kernel = LFilterKernel::try_new(LFilterConfig { b: ba.b, a: ba.a })
            .expect("designed coefficients should be valid");
        let mut out = vec![0.0; signal.len()];

        group.bench_with_input(BenchmarkId::from_parameter(order), &signal, |bench, sig| {
            bench.iter(|| kernel.run_into(black_box(sig), black_box(&mut out)))
        });
    }
    group.finish();
}

criterion_group!(benches, apply_bandpass);
criterion_main!(benches);
