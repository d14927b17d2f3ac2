use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sigforge::signal::wave::{generate, SignalSpec, Waveform};

/// One second at 44.1 kHz for each waveform family.
fn generate_one_second(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for waveform in [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Chirp,
        Waveform::Fm,
        Waveform::PinkNoise,
    ] {
        let spec = SignalSpec::new(waveform, 1000.0, 1.0, 44_100.0)
            .with_noise(0.05)
            .with_seed(1);
        group.bench_with_input(BenchmarkId::from_parameter(waveform), &spec, |bench, spec| {
            bench.iter(|| generate(black_box(spec)))
        });
    }
    group.finish();
}

criterion_group!(benches, generate_one_second);
criterion_main!(benches);
