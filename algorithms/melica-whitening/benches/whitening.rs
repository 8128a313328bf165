use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use melica::traits::{Fit, Transformer};
use melica::PixelMatrix;
use melica_whitening::Whitener;
use ndarray::{array, Array2};
use ndarray_rand::{
    rand::distributions::Uniform, rand::rngs::SmallRng, rand::SeedableRng, RandomExt,
};

fn whitening_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(21);
    let mixing = array![[0.9, 0.5, 0.3], [0.2, 0.7, 0.4], [0.1, 0.3, 0.8]];

    let mut benchmark = c.benchmark_group("whitening");
    for side in [64, 256, 512] {
        let records = Array2::random_using((side * side, 3), Uniform::new(0., 1.), &mut rng);
        let pixels = PixelMatrix::new(records.dot(&mixing), (side, side)).unwrap();
        benchmark.bench_function(BenchmarkId::new("fit_transform", side), |bencher| {
            bencher.iter(|| {
                Whitener::params()
                    .fit(black_box(&pixels))
                    .unwrap()
                    .transform(black_box(&pixels))
            });
        });
    }

    benchmark.finish();
}

criterion_group!(benches, whitening_bench);
criterion_main!(benches);
