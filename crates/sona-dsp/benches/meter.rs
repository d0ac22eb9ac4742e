use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use sona_dsp::meter::LevelMeter;

fn bench_meter(c: &mut Criterion) {
    // One tick's worth of stereo audio at a 60 Hz consumer cadence.
    let block: Vec<f32> = (0..1_600)
        .map(|i| (i as f32 * 0.01).sin())
        .collect();

    let mut meter = LevelMeter::new(2, 48_000);
    c.bench_function("meter_process_stereo_tick", |b| {
        b.iter(|| meter.process_interleaved(black_box(&block)));
    });

    let mut meter = LevelMeter::new(8, 48_000);
    c.bench_function("meter_process_8ch_tick", |b| {
        b.iter(|| meter.process_interleaved(black_box(&block)));
    });
}

criterion_group!(benches, bench_meter);
criterion_main!(benches);
