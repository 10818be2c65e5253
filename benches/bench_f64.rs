//! `f64` baseline for the fixed-point benches, same inputs where it makes sense.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("f64_arithmetic");
    let (x, y) = (42.5_f64, -18.2_f64);

    group.bench_function("add", |b| b.iter(|| black_box(black_box(x) + black_box(y))));
    group.bench_function("sub", |b| b.iter(|| black_box(black_box(x) - black_box(y))));
    group.bench_function("mul", |b| b.iter(|| black_box(black_box(2.5_f64) * black_box(1.25))));
    group.bench_function("div", |b| b.iter(|| black_box(black_box(x) / black_box(1.25_f64))));
    group.finish();
}

fn bench_adc_to_voltage(c: &mut Criterion) {
    c.bench_function("f64_adc_to_voltage", |b| {
        b.iter(|| black_box(black_box(3185u32) as f64 / 4095.0 * 3.3));
    });
}

fn bench_sum(c: &mut Criterion) {
    c.bench_function("f64_sum_1000_values", |b| {
        let values: Vec<f64> = (0..1000).map(|i| i as f64 * 0.25 - 100.0).collect();
        b.iter(|| black_box(values.iter().copied().sum::<f64>()));
    });
}

fn bench_int_frac_split(c: &mut Criterion) {
    c.bench_function("f64_int_frac_split", |b| {
        b.iter(|| {
            let v = black_box(-2.25_f64);
            black_box((v.floor(), v.abs().fract()))
        });
    });
}

fn bench_abs_sign(c: &mut Criterion) {
    c.bench_function("f64_abs_sign", |b| {
        b.iter(|| {
            let v = black_box(-18.2_f64);
            black_box((v.abs(), v.signum()))
        });
    });
}

criterion_group!(
    benches,
    bench_arithmetic,
    bench_adc_to_voltage,
    bench_sum,
    bench_int_frac_split,
    bench_abs_sign,
);

criterion_main!(benches);
