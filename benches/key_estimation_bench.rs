//! Performance benchmarks for key estimation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyfinder_dsp::features::chroma::extract_chroma;
use keyfinder_dsp::features::key::{detect_key, KRUMHANSL_SCHMUCKLER};
use keyfinder_dsp::preprocessing::hpss::{harmonic_component, HpssConfig};
use keyfinder_dsp::{estimate_key, AnalysisConfig, ChromaVector};

const SAMPLE_RATE: u32 = 11025;

/// 22 seconds of a C major triad
fn triad() -> Vec<f32> {
    (0..SAMPLE_RATE as usize * 22)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            [261.63f32, 329.63, 392.0]
                .iter()
                .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                .sum::<f32>()
                * 0.25
        })
        .collect()
}

fn bench_chroma(c: &mut Criterion) {
    let samples = triad();
    let config = AnalysisConfig::default();

    c.bench_function("extract_chroma_22s", |b| {
        b.iter(|| extract_chroma(black_box(&samples), black_box(SAMPLE_RATE), &config));
    });
}

fn bench_detect(c: &mut Criterion) {
    let chroma = ChromaVector::new([
        10.654, 4.31, 6.304, 4.362, 8.18, 7.274, 4.672, 7.862, 4.926, 8.724, 4.434, 5.696,
    ]);

    c.bench_function("detect_key", |b| {
        b.iter(|| detect_key(black_box(&chroma), &KRUMHANSL_SCHMUCKLER, 0.9));
    });
}

fn bench_estimate(c: &mut Criterion) {
    let samples = triad();

    c.bench_function("estimate_key_22s", |b| {
        b.iter(|| estimate_key(black_box(&samples), black_box(SAMPLE_RATE), None, None));
    });
}

fn bench_hpss(c: &mut Criterion) {
    let samples = triad();
    let config = HpssConfig::default();

    c.bench_function("harmonic_component_22s", |b| {
        b.iter(|| harmonic_component(black_box(&samples), &config));
    });
}

criterion_group!(benches, bench_chroma, bench_detect, bench_estimate, bench_hpss);
criterion_main!(benches);
