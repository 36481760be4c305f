use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use markertrack::{
    processing::ProcessingParams,
    trajectory::{gap_filler::fill_gaps, MarkerId, Position, Trajectory},
};

/// Random walk of `n` samples with random dropouts of 1 to 40 samples.
fn noisy_light(rng: &mut StdRng, n: usize, dropout_rate: f64) -> Vec<Position> {
    let (mut x, mut y) = (320.0_f64, 240.0_f64);
    let mut column = Vec::with_capacity(n);
    let mut lost_left = 0usize;
    for _ in 0..n {
        x = (x + rng.random_range(-3.0..3.0)).clamp(0.0, 639.0);
        y = (y + rng.random_range(-3.0..3.0)).clamp(0.0, 479.0);
        if lost_left == 0 && rng.random::<f64>() < dropout_rate {
            lost_left = rng.random_range(1..=40);
        }
        if lost_left > 0 {
            lost_left -= 1;
            column.push(Position::Lost);
        } else {
            column.push(Position::new(x.round(), y.round()));
        }
    }
    column
}

fn recording(rng: &mut StdRng, n: usize, lights: u8) -> Trajectory {
    let markers: BTreeMap<MarkerId, Vec<Position>> = (1..=lights)
        .map(|k| (MarkerId::Light(k), noisy_light(rng, n, 0.01)))
        .collect();
    let times = (0..n).map(|i| i as f64 / 30.0).collect();
    Trajectory::new((0..n as u64).collect(), times, markers).unwrap()
}

/// One hour at 30 Hz, two head lights.
fn bench_one_hour(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let params = ProcessingParams::builder()
        .frame_size(640.0, 480.0)
        .build()
        .unwrap();

    c.bench_function("fill_gaps/1h_30Hz_2_lights", |b| {
        b.iter_batched(
            || recording(&mut rng, 108_000, 2),
            |raw| black_box(fill_gaps(black_box(&raw), 30.0, &params).unwrap()),
            BatchSize::LargeInput,
        )
    });
}

/// Ten minutes at 30 Hz, eight lights.
fn bench_many_lights(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xFACADE);
    let params = ProcessingParams::default();
    let raw = recording(&mut rng, 18_000, 8);

    c.bench_function("fill_gaps/10min_30Hz_8_lights", |b| {
        b.iter(|| black_box(fill_gaps(black_box(&raw), 30.0, &params).unwrap()))
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_one_hour, bench_many_lights
);
criterion_main!(benches);
