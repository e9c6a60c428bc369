//! Benchmarks for the fit engine and model sweeps.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fitlab_rs::{Dataset, EquationRegistry, FitConfig, FitEngine, Sweep};
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

fn noisy(name: &str, n: usize, f: impl Fn(f64) -> f64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let noise = Normal::new(0.0, 0.05).unwrap();
    let x = Array1::linspace(0.0, 4.0 * std::f64::consts::PI, n);
    let y = x.mapv(|v| f(v) + noise.sample(&mut rng));
    Dataset::new(name, x, y)
}

fn bench_linear_fit(c: &mut Criterion) {
    let registry = EquationRegistry::with_builtins().unwrap();
    let engine = FitEngine::default();
    let spec = registry.lookup("linear_function_with_n").unwrap();

    let mut group = c.benchmark_group("linear_fit");
    for n in [10, 100, 1000] {
        let data = noisy("line", n, |v| 1.5 * v - 2.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| black_box(engine.fit(data, spec)))
        });
    }
    group.finish();
}

fn bench_periodic_fit(c: &mut Criterion) {
    let registry = EquationRegistry::with_builtins().unwrap();
    let engine = FitEngine::default();
    let spec = registry.lookup("sin_function_with_c").unwrap();
    let data = noisy("wave", 200, |v| 3.0 * (1.3 * v + 0.4).sin());

    c.bench_function("periodic_fit", |b| b.iter(|| black_box(engine.fit(&data, spec))));
}

fn bench_total_sweep(c: &mut Criterion) {
    let registry = EquationRegistry::with_builtins().unwrap();
    let data = noisy("sweep", 100, |v| 0.5 * v * v + 1.0);

    let mut group = c.benchmark_group("total_sweep");
    group.sample_size(10); // Each iteration fits every registered model

    let sequential = FitEngine::default();
    group.bench_function("sequential", |b| {
        b.iter(|| {
            let sweep = Sweep::total(&sequential, &registry, &data, "bench");
            black_box(sweep.iter().filter(|item| item.outcome.is_ok()).count())
        })
    });

    let parallel = FitEngine::new(FitConfig::default().with_parallel_sweeps(true)).unwrap();
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(Sweep::total(&parallel, &registry, &data, "bench").collect_all()))
    });
    group.finish();
}

criterion_group!(benches, bench_linear_fit, bench_periodic_fit, bench_total_sweep);
criterion_main!(benches);
