use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gf128_field::field::FiniteField;

const P128: u128 = u128::MAX - 158; // 2^128 - 159

fn bench_element_ops(c: &mut Criterion) {
    let f = FiniteField::new(P128);
    let x = f.rand();
    let y = f.rand();

    c.bench_function("add", |b| b.iter(|| f.add(black_box(x), black_box(y))));
    c.bench_function("mul", |b| b.iter(|| f.mul(black_box(x), black_box(y))));
    c.bench_function("inv", |b| b.iter(|| f.inv(black_box(x))));
    c.bench_function("exp", |b| {
        b.iter(|| f.exp(black_box(x), black_box(P128 - 2)).unwrap())
    });
}

fn bench_batch_inverse(c: &mut Criterion) {
    let f = FiniteField::new(P128);
    let v = f.prng_vector(b"bench", 1 << 12);
    c.bench_function("batch_inverse/4096", |b| {
        b.iter(|| f.inv_vector_elements(black_box(&v)))
    });
}

fn bench_mat_mul(c: &mut Criterion) {
    let f = FiniteField::new(P128);
    let n = 64;
    let a = f
        .matrix_from_values(n, n, f.prng_vector(b"a", n * n).to_values().to_vec())
        .unwrap();
    let b_mat = f
        .matrix_from_values(n, n, f.prng_vector(b"b", n * n).to_values().to_vec())
        .unwrap();
    c.bench_function("mat_mul/64x64", |b| {
        b.iter(|| f.mul_matrices(black_box(&a), black_box(&b_mat)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_element_ops,
    bench_batch_inverse,
    bench_mat_mul
);
criterion_main!(benches);
