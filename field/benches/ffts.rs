use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gf128_field::field::FiniteField;

// The Goldilocks prime; its 2-adicity of 32 leaves room for any bench size.
const GOLDILOCKS: u128 = 0xFFFF_FFFF_0000_0001;

fn bench_ffts(c: &mut Criterion) {
    let f = FiniteField::new(GOLDILOCKS);
    let mut group = c.benchmark_group("fft");

    for size_log in [10usize, 12, 14] {
        let size = 1 << size_log;
        let roots = f
            .get_power_cycle(f.get_root_of_unity(size as u128).unwrap())
            .unwrap();
        let poly = f.prng_vector(b"fft-bench", size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| f.eval_poly_at_roots(&poly, &roots).unwrap())
        });
    }
    group.finish();
}

fn bench_interpolation(c: &mut Criterion) {
    let f = FiniteField::new(GOLDILOCKS);
    let mut group = c.benchmark_group("ifft");

    for size_log in [10usize, 12] {
        let size = 1 << size_log;
        let roots = f
            .get_power_cycle(f.get_root_of_unity(size as u128).unwrap())
            .unwrap();
        let ys = f.prng_vector(b"ifft-bench", size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| f.interpolate_roots(&roots, &ys).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ffts, bench_interpolation);
criterion_main!(benches);
