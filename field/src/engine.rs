//! Bulk operations over contiguous arrays of field elements.
//!
//! Two engines implement one contract: [`CoreEngine`] runs plain sequential
//! loops, [`PackedEngine`] runs the same kernels over fixed-size lane blocks
//! that may execute in parallel. Outputs are bit-identical; only scheduling
//! differs. The façade picks one at field construction and the selected
//! engine never changes afterwards.

use gf128_maybe_rayon::*;

use crate::prime::PrimeField128;

/// Elementwise binary operations the bulk engine understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Right-hand operand of an elementwise call: a full array, or a scalar
/// broadcast to every lane. Both forms run through the same kernel.
#[derive(Copy, Clone, Debug)]
pub enum Operand<'a> {
    Elements(&'a [u128]),
    Scalar(u128),
}

#[inline]
fn apply(f: &PrimeField128, op: ElementOp, x: u128, y: u128) -> u128 {
    match op {
        ElementOp::Add => f.add(x, y),
        ElementOp::Sub => f.sub(x, y),
        ElementOp::Mul => f.mul(x, y),
        ElementOp::Div => f.div(x, y),
    }
}

/// The bulk-operation contract shared by both engines.
///
/// Shape checks live in the façade; engines assume conformable inputs
/// (`Elements` operands of equal length, matrices of the stated dimensions)
/// and always allocate fresh output.
pub trait FieldEngine {
    /// Elementwise `a[i] op b[i]` (or `a[i] op s` for a scalar operand).
    fn elementwise(&self, f: &PrimeField128, op: ElementOp, a: &[u128], b: Operand<'_>)
        -> Vec<u128>;

    /// Montgomery batch inversion: one field inversion plus O(n) multiplies.
    /// Zero inputs invert to zero.
    fn batch_inverse(&self, f: &PrimeField128, values: &[u128]) -> Vec<u128>;

    /// `[1, seed, seed^2, ...]` of the given length. The chain is sequential
    /// by definition; both engines share one implementation.
    fn power_series(&self, f: &PrimeField128, seed: u128, n: usize) -> Vec<u128>;

    /// Row-major `(rows x inner) * (inner x cols)` product.
    fn mat_mul(
        &self,
        f: &PrimeField128,
        a: &[u128],
        b: &[u128],
        rows: usize,
        inner: usize,
        cols: usize,
    ) -> Vec<u128>;

    /// Dot product of two equal-length arrays.
    fn dot(&self, f: &PrimeField128, a: &[u128], b: &[u128]) -> u128;
}

/// Montgomery's trick with the `inv(0) = 0` convention.
///
/// The forward pass accumulates prefix products, substituting 1 for zero
/// entries so a single inversion still covers sparse inputs; the backward
/// pass peels per-element inverses off the inverted total.
pub(crate) fn montgomery_batch_inverse(f: &PrimeField128, values: &[u128]) -> Vec<u128> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut prefix = Vec::with_capacity(n);
    let mut running = PrimeField128::ONE;
    for &v in values {
        prefix.push(running);
        if v != 0 {
            running = f.mul(running, v);
        }
    }

    let mut k = f.inv(running);
    let mut out = vec![0u128; n];
    for i in (0..n).rev() {
        if values[i] != 0 {
            out[i] = f.mul(prefix[i], k);
            k = f.mul(k, values[i]);
        }
    }
    out
}

fn power_series(f: &PrimeField128, seed: u128, n: usize) -> Vec<u128> {
    f.powers(seed).take(n).collect()
}

/// The direct in-memory engine: straightforward sequential loops.
#[derive(Copy, Clone, Debug, Default)]
pub struct CoreEngine;

impl FieldEngine for CoreEngine {
    fn elementwise(
        &self,
        f: &PrimeField128,
        op: ElementOp,
        a: &[u128],
        b: Operand<'_>,
    ) -> Vec<u128> {
        match b {
            Operand::Elements(bs) => a
                .iter()
                .zip(bs)
                .map(|(&x, &y)| apply(f, op, x, y))
                .collect(),
            Operand::Scalar(s) => a.iter().map(|&x| apply(f, op, x, s)).collect(),
        }
    }

    fn batch_inverse(&self, f: &PrimeField128, values: &[u128]) -> Vec<u128> {
        montgomery_batch_inverse(f, values)
    }

    fn power_series(&self, f: &PrimeField128, seed: u128, n: usize) -> Vec<u128> {
        power_series(f, seed, n)
    }

    fn mat_mul(
        &self,
        f: &PrimeField128,
        a: &[u128],
        b: &[u128],
        rows: usize,
        inner: usize,
        cols: usize,
    ) -> Vec<u128> {
        let mut out = vec![0u128; rows * cols];
        for (i, out_row) in out.chunks_mut(cols.max(1)).enumerate().take(rows) {
            mat_mul_row(f, &a[i * inner..(i + 1) * inner], b, cols, out_row);
        }
        out
    }

    fn dot(&self, f: &PrimeField128, a: &[u128], b: &[u128]) -> u128 {
        a.iter()
            .zip(b)
            .fold(0, |acc, (&x, &y)| f.add(acc, f.mul(x, y)))
    }
}

/// One output row of the matrix product; the i-k-j loop order walks both
/// operands along cache lines.
fn mat_mul_row(f: &PrimeField128, a_row: &[u128], b: &[u128], cols: usize, out_row: &mut [u128]) {
    for (k, &aik) in a_row.iter().enumerate() {
        if aik == 0 {
            continue;
        }
        let b_row = &b[k * cols..(k + 1) * cols];
        for (o, &bkj) in out_row.iter_mut().zip(b_row) {
            *o = f.add(*o, f.mul(aik, bkj));
        }
    }
}

/// Elements per block handed to one lane of the packed engine.
const LANE_BLOCK: usize = 1 << 10;

/// The accelerated engine: the same kernels over independent lane blocks,
/// parallelized when the `parallel` feature is on.
///
/// Inherently sequential chains (batch inversion, power series) share the
/// scalar implementations; parallelism is only applied where lanes are
/// independent, so results stay bit-identical to [`CoreEngine`].
#[derive(Copy, Clone, Debug, Default)]
pub struct PackedEngine;

impl FieldEngine for PackedEngine {
    fn elementwise(
        &self,
        f: &PrimeField128,
        op: ElementOp,
        a: &[u128],
        b: Operand<'_>,
    ) -> Vec<u128> {
        let mut out = vec![0u128; a.len()];
        match b {
            Operand::Elements(bs) => {
                out.par_chunks_mut(LANE_BLOCK)
                    .zip(a.par_chunks(LANE_BLOCK))
                    .zip(bs.par_chunks(LANE_BLOCK))
                    .for_each(|((o, av), bv)| {
                        for ((o, &x), &y) in o.iter_mut().zip(av).zip(bv) {
                            *o = apply(f, op, x, y);
                        }
                    });
            }
            Operand::Scalar(s) => {
                out.par_chunks_mut(LANE_BLOCK)
                    .zip(a.par_chunks(LANE_BLOCK))
                    .for_each(|(o, av)| {
                        for (o, &x) in o.iter_mut().zip(av) {
                            *o = apply(f, op, x, s);
                        }
                    });
            }
        }
        out
    }

    fn batch_inverse(&self, f: &PrimeField128, values: &[u128]) -> Vec<u128> {
        montgomery_batch_inverse(f, values)
    }

    fn power_series(&self, f: &PrimeField128, seed: u128, n: usize) -> Vec<u128> {
        power_series(f, seed, n)
    }

    fn mat_mul(
        &self,
        f: &PrimeField128,
        a: &[u128],
        b: &[u128],
        rows: usize,
        inner: usize,
        cols: usize,
    ) -> Vec<u128> {
        let mut out = vec![0u128; rows * cols];
        if cols == 0 {
            return out;
        }
        out.par_chunks_mut(cols)
            .zip(a.par_chunks(inner.max(1)))
            .for_each(|(out_row, a_row)| mat_mul_row(f, a_row, b, cols, out_row));
        out
    }

    fn dot(&self, f: &PrimeField128, a: &[u128], b: &[u128]) -> u128 {
        // Kept sequential: the packed engine must reproduce the scalar
        // accumulation order bit for bit.
        CoreEngine.dot(f, a, b)
    }
}

/// The engine a [`crate::field::FiniteField`] dispatches through, chosen at
/// construction time.
#[derive(Copy, Clone, Debug)]
pub enum Engine {
    Core(CoreEngine),
    Packed(PackedEngine),
}

impl FieldEngine for Engine {
    fn elementwise(
        &self,
        f: &PrimeField128,
        op: ElementOp,
        a: &[u128],
        b: Operand<'_>,
    ) -> Vec<u128> {
        match self {
            Engine::Core(e) => e.elementwise(f, op, a, b),
            Engine::Packed(e) => e.elementwise(f, op, a, b),
        }
    }

    fn batch_inverse(&self, f: &PrimeField128, values: &[u128]) -> Vec<u128> {
        match self {
            Engine::Core(e) => e.batch_inverse(f, values),
            Engine::Packed(e) => e.batch_inverse(f, values),
        }
    }

    fn power_series(&self, f: &PrimeField128, seed: u128, n: usize) -> Vec<u128> {
        match self {
            Engine::Core(e) => e.power_series(f, seed, n),
            Engine::Packed(e) => e.power_series(f, seed, n),
        }
    }

    fn mat_mul(
        &self,
        f: &PrimeField128,
        a: &[u128],
        b: &[u128],
        rows: usize,
        inner: usize,
        cols: usize,
    ) -> Vec<u128> {
        match self {
            Engine::Core(e) => e.mat_mul(f, a, b, rows, inner, cols),
            Engine::Packed(e) => e.mat_mul(f, a, b, rows, inner, cols),
        }
    }

    fn dot(&self, f: &PrimeField128, a: &[u128], b: &[u128]) -> u128 {
        match self {
            Engine::Core(e) => e.dot(f, a, b),
            Engine::Packed(e) => e.dot(f, a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        montgomery_batch_inverse, CoreEngine, ElementOp, FieldEngine, Operand, PackedEngine,
    };
    use crate::field_testing::{rand_elements, P128};
    use crate::prime::PrimeField128;

    #[test]
    fn engines_are_bit_identical() {
        let f = PrimeField128::new(P128);
        // Longer than one lane block so the packed engine splits.
        let a = rand_elements(&f, 3000);
        let b = rand_elements(&f, 3000);
        let s = f.rand();

        for op in [
            ElementOp::Add,
            ElementOp::Sub,
            ElementOp::Mul,
            ElementOp::Div,
        ] {
            assert_eq!(
                CoreEngine.elementwise(&f, op, &a, Operand::Elements(&b)),
                PackedEngine.elementwise(&f, op, &a, Operand::Elements(&b)),
            );
            assert_eq!(
                CoreEngine.elementwise(&f, op, &a, Operand::Scalar(s)),
                PackedEngine.elementwise(&f, op, &a, Operand::Scalar(s)),
            );
        }
    }

    #[test]
    fn scalar_broadcast() {
        let f = PrimeField128::new(P128);
        let v = [1u128, 2, 3, 4];
        let out = CoreEngine.elementwise(&f, ElementOp::Mul, &v, Operand::Scalar(5));
        assert_eq!(out, vec![5, 10, 15, 20]);
    }

    #[test]
    fn elementwise_on_empty_input() {
        let f = PrimeField128::new(P128);
        let out = CoreEngine.elementwise(&f, ElementOp::Add, &[], Operand::Elements(&[]));
        assert_eq!(out.len(), 0);
    }

    #[test]
    fn division_by_zero_lane_is_zero() {
        let f = PrimeField128::new(P128);
        let out = CoreEngine.elementwise(&f, ElementOp::Div, &[7, 9], Operand::Elements(&[0, 3]));
        assert_eq!(out[0], 0);
        assert_eq!(out[1], f.div(9, 3));
    }

    #[test]
    fn batch_inverse_round_trip() {
        let f = PrimeField128::new(P128);
        let mut v = rand_elements(&f, 40);
        v[0] = 0;
        v[17] = 0;
        v[39] = 0;

        let inv = montgomery_batch_inverse(&f, &v);
        let back = montgomery_batch_inverse(&f, &inv);
        assert_eq!(back, v);
        for (&x, &xi) in v.iter().zip(&inv) {
            if x == 0 {
                assert_eq!(xi, 0);
            } else {
                assert_eq!(f.mul(x, xi), 1);
                assert_eq!(xi, f.inv(x));
            }
        }
    }

    #[test]
    fn batch_inverse_short_inputs() {
        let f = PrimeField128::new(P128);
        assert_eq!(montgomery_batch_inverse(&f, &[]), Vec::<u128>::new());
        assert_eq!(montgomery_batch_inverse(&f, &[0]), vec![0]);
        assert_eq!(montgomery_batch_inverse(&f, &[2]), vec![f.inv(2)]);
    }

    #[test]
    fn power_series_sequence() {
        let f = PrimeField128::new(P128);
        assert_eq!(
            CoreEngine.power_series(&f, 3, 5),
            vec![1, 3, 9, 27, 81]
        );
        assert_eq!(CoreEngine.power_series(&f, 3, 0), Vec::<u128>::new());
    }

    #[test]
    fn mat_mul_known_product() {
        let f = PrimeField128::new(P128);
        // [1 2; 3 4] * [5 6; 7 8] = [19 22; 43 50]
        let a = [1u128, 2, 3, 4];
        let b = [5u128, 6, 7, 8];
        let c = CoreEngine.mat_mul(&f, &a, &b, 2, 2, 2);
        assert_eq!(c, vec![19, 22, 43, 50]);
        assert_eq!(PackedEngine.mat_mul(&f, &a, &b, 2, 2, 2), c);
    }

    #[test]
    fn mat_mul_associativity() {
        let f = PrimeField128::new(P128);
        let a = rand_elements(&f, 3 * 4);
        let b = rand_elements(&f, 4 * 5);
        let c = rand_elements(&f, 5 * 2);

        let ab = CoreEngine.mat_mul(&f, &a, &b, 3, 4, 5);
        let ab_c = CoreEngine.mat_mul(&f, &ab, &c, 3, 5, 2);
        let bc = CoreEngine.mat_mul(&f, &b, &c, 4, 5, 2);
        let a_bc = CoreEngine.mat_mul(&f, &a, &bc, 3, 4, 2);
        assert_eq!(ab_c, a_bc);
    }

    #[test]
    fn dot_product() {
        let f = PrimeField128::new(P128);
        assert_eq!(CoreEngine.dot(&f, &[1, 2, 3], &[4, 5, 6]), 32);
        assert_eq!(CoreEngine.dot(&f, &[], &[]), 0);
    }
}
