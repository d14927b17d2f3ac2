use anyhow::{anyhow, bail, Context, Result};
use ndarray::ArrayView1;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sigforge::api::{
    apply_filter, design_filter, generate_signal, FilterApplyRequest, FilterDesignRequest,
    SignalRequest,
};
use sigforge::signal::filter::apply;
use sigforge::signal::filter::design::{
    synthesize, FilterBandType, FilterDesign, FilterSpec, GainNormalization,
};
use sigforge::signal::response::{frequency_response, impulse_response};
use sigforge::signal::spectral::magnitude_spectrum;
use sigforge::signal::wave::{generate, unit_impulse, SignalSpec, Waveform};
use sigforge_core::num_rs::{convolve, ConvolveMode};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

mod logging;

use logging::{init_logging, LogConfig};

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    passed: bool,
    /// Largest deviation from the expected value, in the case's own unit.
    max_abs: f64,
    tolerance: f64,
    rust_ns: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    passed: usize,
    failed: usize,
    rows: Vec<ContractRow>,
}

fn usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p xtask -- [--log-level LEVEL] [--log-format pretty|compact|json] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  design [FILE]    FilterDesignRequest JSON -> FilterDesignResponse JSON");
    eprintln!("  generate [FILE]  SignalRequest JSON -> SignalResponse JSON");
    eprintln!("  apply [FILE]     FilterApplyRequest JSON -> FilterApplyResponse JSON");
    eprintln!("  contracts        run engine property checks into target/contracts/<ts>/");
    eprintln!();
    eprintln!("FILE defaults to stdin.");
}

fn main() -> Result<()> {
    let mut log_config = LogConfig::default();
    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log-level" => {
                let value = args.next().context("--log-level needs a value")?;
                log_config.level = value.parse()?;
            }
            "--log-format" => {
                let value = args.next().context("--log-format needs a value")?;
                log_config.format = value.parse()?;
            }
            _ => positional.push(arg),
        }
    }
    init_logging(&log_config);

    let input = positional.get(1).map(PathBuf::from);
    match positional.first().map(String::as_str) {
        Some("design") => {
            let request: FilterDesignRequest = read_request(input.as_deref())?;
            write_response(&design_filter(&request)?)
        }
        Some("generate") => {
            let request: SignalRequest = read_request(input.as_deref())?;
            write_response(&generate_signal(&request)?)
        }
        Some("apply") => {
            let request: FilterApplyRequest = read_request(input.as_deref())?;
            write_response(&apply_filter(&request)?)
        }
        Some("contracts") => run_contracts(),
        _ => {
            usage();
            Ok(())
        }
    }
}

fn read_request<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let raw = match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("parsing request JSON")
}

fn write_response<T: Serialize>(response: &T) -> Result<()> {
    let out = serde_json::to_string(response).context("serializing response")?;
    println!("{out}");
    Ok(())
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    fs::create_dir_all(&out_dir).context("creating contract output directory")?;

    let mut rows = Vec::new();

    // Impulse response is the recursion run over a unit impulse, bit for bit.
    {
        let spec = FilterSpec::new(
            FilterBandType::Bandpass,
            FilterDesign::Butterworth,
            3,
            800.0,
            8000.0,
        )
        .with_high_cutoff(1600.0);
        let (ba, _) = synthesize(&spec)?;
        let probe = unit_impulse::<f64>(256, None)?.to_vec();
        let direct = apply(&ba, &probe)?;
        let response = impulse_response(&ba, 256)?;
        let ns = benchmark_avg_ns(200, || impulse_response(&ba, 256).map(|_| ()).map_err(Into::into))?;
        record_case(&mut rows, "impulse_equals_apply", max_abs_error(&direct, &response), 0.0, ns);
    }

    // Lowpass DC gain stays within 1 dB for every supported order.
    for design in [FilterDesign::Butterworth, FilterDesign::ChebyshevI] {
        for order in 1..=8 {
            let spec =
                FilterSpec::new(FilterBandType::Lowpass, design, order, 1000.0, 8000.0).with_ripple(0.5);
            let (ba, _) = synthesize(&spec)?;
            let fr = frequency_response(&ba, 8000.0, 1000)?;
            let dc = fr
                .magnitudes
                .first()
                .copied()
                .ok_or_else(|| anyhow!("empty frequency grid"))?;
            let ns = benchmark_avg_ns(50, || synthesize(&spec).map(|_| ()).map_err(Into::into))?;
            record_case(&mut rows, &format!("lowpass_dc_gain_{design}_{order}"), dc.abs(), 1.0, ns);
        }
    }

    // Highpass passes Nyquist at unity gain.
    {
        let spec = FilterSpec::new(
            FilterBandType::Highpass,
            FilterDesign::Butterworth,
            4,
            1000.0,
            8000.0,
        );
        let (ba, _) = synthesize(&spec)?;
        let b_alt: f64 = ba.b.iter().enumerate().map(|(i, c)| if i % 2 == 0 { *c } else { -c }).sum();
        let a_alt: f64 = ba.a.iter().enumerate().map(|(i, c)| if i % 2 == 0 { *c } else { -c }).sum();
        let ns = benchmark_avg_ns(50, || synthesize(&spec).map(|_| ()).map_err(Into::into))?;
        record_case(&mut rows, "highpass_nyquist_gain", (b_alt / a_alt - 1.0).abs(), 1e-9, ns);
    }

    // Every stable design keeps its poles strictly inside the unit circle.
    for band in [
        FilterBandType::Lowpass,
        FilterBandType::Highpass,
        FilterBandType::Bandpass,
        FilterBandType::Bandstop,
    ] {
        let spec = FilterSpec::new(band, FilterDesign::Butterworth, 4, 500.0, 8000.0)
            .with_high_cutoff(2500.0);
        let (_, zpk) = synthesize(&spec)?;
        let radius = zpk.p.iter().map(|p| p.norm()).fold(0.0, f64::max);
        let ns = benchmark_avg_ns(50, || synthesize(&spec).map(|_| ()).map_err(Into::into))?;
        // Deviation is how far past the circle the outermost pole sits.
        record_case(&mut rows, &format!("poles_inside_unit_circle_{band}"), (radius - 1.0).max(0.0), 0.0, ns);
        if radius >= 1.0 {
            warn!(%band, radius, "pole on or outside the unit circle");
        }
    }

    // Absolute-sum normalization makes sum |a_i| == 1.
    {
        let spec = FilterSpec::new(
            FilterBandType::Lowpass,
            FilterDesign::Butterworth,
            3,
            1000.0,
            8000.0,
        )
        .with_normalization(GainNormalization::AbsoluteSum);
        let (ba, _) = synthesize(&spec)?;
        let sum: f64 = ba.a.iter().map(|c: &f64| c.abs()).sum();
        let ns = benchmark_avg_ns(50, || synthesize(&spec).map(|_| ()).map_err(Into::into))?;
        record_case(&mut rows, "absolute_sum_normalization", (sum - 1.0).abs(), 1e-12, ns);
    }

    // A generated sine peaks in the spectrum within one bin of its frequency.
    for frequency in [440.0, 1000.0, 3150.0] {
        let spec = SignalSpec::new(Waveform::Sine, frequency, 0.5, 8000.0);
        let signal = generate(&spec)?;
        let spectrum = magnitude_spectrum(&signal)?;
        let peak = spectrum
            .peak_frequency()
            .ok_or_else(|| anyhow!("empty spectrum"))?;
        let ns = benchmark_avg_ns(20, || generate(&spec).map(|_| ()).map_err(Into::into))?;
        record_case(
            &mut rows,
            &format!("sine_spectrum_peak_{frequency}"),
            (peak - frequency).abs(),
            spectrum.bin_width(),
            ns,
        );
    }

    // Pink noise spreads less than white noise at the same amplitude.
    {
        let white = generate(&SignalSpec::new(Waveform::WhiteNoise, 1000.0, 1.0, 100_000.0).with_seed(3))?;
        let pink = generate(&SignalSpec::new(Waveform::PinkNoise, 1000.0, 1.0, 100_000.0).with_seed(3))?;
        let margin = std_dev(&white.samples) - std_dev(&pink.samples);
        let ns = benchmark_avg_ns(5, || {
            generate(&SignalSpec::new(Waveform::PinkNoise, 1000.0, 1.0, 100_000.0))
                .map(|_| ())
                .map_err(Into::into)
        })?;
        // Fails when pink is at least as spread as white.
        record_case(&mut rows, "pink_narrower_than_white", (-margin).max(0.0), 0.0, ns);
    }

    // Full convolution of a known pair.
    {
        let a = [1.0, 2.0];
        let v = [1.0, 1.0];
        let got = convolve(ArrayView1::from(&a[..]), ArrayView1::from(&v[..]), ConvolveMode::Full)?;
        let ns = benchmark_avg_ns(1000, || {
            convolve(ArrayView1::from(&a[..]), ArrayView1::from(&v[..]), ConvolveMode::Full)
                .map(|_| ())
                .map_err(Into::into)
        })?;
        ensure_same_length("convolve_full", &got.to_vec(), &[1.0, 3.0, 2.0])?;
        record_case(&mut rows, "convolve_full", max_abs_error(&got.to_vec(), &[1.0, 3.0, 2.0]), 0.0, ns);
    }

    let passed = rows.iter().filter(|r| r.passed).count();
    let failed = rows.len() - passed;
    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        passed,
        failed,
        rows,
    };

    let summary_json = out_dir.join("summary.json");
    fs::write(&summary_json, serde_json::to_vec_pretty(&bundle)?)
        .with_context(|| format!("writing {}", summary_json.display()))?;
    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;

    info!(passed, failed, dir = %out_dir.display(), "contracts written");
    if failed > 0 {
        bail!("{failed} contract case(s) failed");
    }
    Ok(())
}

fn record_case(rows: &mut Vec<ContractRow>, case_id: &str, max_abs: f64, tolerance: f64, rust_ns: f64) {
    let passed = max_abs <= tolerance;
    if !passed {
        warn!(case_id, max_abs, tolerance, "contract case failed");
    }
    rows.push(ContractRow {
        case_id: case_id.to_string(),
        passed,
        max_abs,
        tolerance,
        rust_ns,
    });
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn std_dev(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    (x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str("case_id,passed,max_abs,tolerance,rust_ns\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{:.12},{:.12},{:.3}\n",
            row.case_id, row.passed, row.max_abs, row.tolerance, row.rust_ns
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}
