//! Criterion benchmarks for the spectral pipeline
//!
//! Run with: cargo bench -p agudo-dsp

use agudo_dsp::{BandwidthExtender, ExtendParams, Stft};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::f32::consts::PI;

fn test_signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / 44100.0;
            (2.0 * PI * 220.0 * t).sin() + 0.5 * (2.0 * PI * 880.0 * t).sin()
        })
        .collect()
}

fn bench_stft(c: &mut Criterion) {
    let stft = Stft::new(4096, 2048);
    let signal = test_signal(44100);

    c.bench_function("stft_forward_1s", |b| {
        b.iter(|| stft.forward(black_box(&signal)))
    });

    let spectrogram = stft.forward(&signal);
    c.bench_function("stft_inverse_1s", |b| {
        b.iter(|| stft.inverse(black_box(&spectrogram)))
    });
}

fn bench_extend(c: &mut Criterion) {
    let extender = BandwidthExtender::default();
    let signal = test_signal(44100);
    let params = ExtendParams {
        sample_rate: 44100,
        cutoff_hz: 12000.0,
        ..Default::default()
    };

    c.bench_function("extend_1s_stereo", |b| {
        b.iter(|| extender.extend(black_box(&signal), black_box(&signal), &params, None))
    });
}

criterion_group!(benches, bench_stft, bench_extend);
criterion_main!(benches);
