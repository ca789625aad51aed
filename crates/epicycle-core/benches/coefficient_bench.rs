use criterion::{black_box, criterion_group, criterion_main, Criterion};
use epicycle_core::{coefficient, frequency_for_index, Drawable, EpicycleConfig, PathSampler};

const HEART: &str = include_str!("../../../assets/drawables/heart.svg");

fn coefficient_benchmark(c: &mut Criterion) {
    let config = EpicycleConfig::default();
    let drawable = Drawable::parse("heart.svg", HEART, config.half_extent).unwrap();
    let sampler = PathSampler::new(&drawable.path, config.arc_accuracy);

    c.bench_function("sample heart at 125", |b| {
        b.iter(|| sampler.sample(black_box(config.sampling_rate)))
    });

    let samples = sampler.sample(config.sampling_rate);
    c.bench_function("coefficients 0..100", |b| {
        b.iter(|| {
            for index in 0..100 {
                black_box(coefficient(&samples, frequency_for_index(index)));
            }
        })
    });
}

criterion_group!(benches, coefficient_benchmark);
criterion_main!(benches);
