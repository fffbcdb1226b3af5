//! Dense polynomial arithmetic and interpolation.
//!
//! Polynomials share the vector representation: index `i` holds the
//! coefficient of `x^i`, and the degree is the last nonzero index.

use itertools::{izip, EitherOrBoth, Itertools};
use unroll::unroll_for_loops;

use crate::engine::{ElementOp, FieldEngine};
use crate::errors::{FieldError, Result};
use crate::field::FiniteField;
use crate::matrix::FieldMatrix;
use crate::prime::PrimeField128;
use crate::vector::FieldVector;

impl FiniteField {
    /// Coefficient-wise sum; the shorter operand is implicitly zero-padded.
    pub fn add_polys(&self, a: &FieldVector, b: &FieldVector) -> FieldVector {
        let f = &self.field;
        let coeffs = a
            .to_values()
            .iter()
            .zip_longest(b.to_values())
            .map(|pair| match pair {
                EitherOrBoth::Both(&x, &y) => f.add(x, y),
                EitherOrBoth::Left(&x) => x,
                EitherOrBoth::Right(&y) => y,
            })
            .collect();
        self.wrap_vector(coeffs)
    }

    /// Coefficient-wise difference; the shorter operand is implicitly
    /// zero-padded.
    pub fn sub_polys(&self, a: &FieldVector, b: &FieldVector) -> FieldVector {
        let f = &self.field;
        let coeffs = a
            .to_values()
            .iter()
            .zip_longest(b.to_values())
            .map(|pair| match pair {
                EitherOrBoth::Both(&x, &y) => f.sub(x, y),
                EitherOrBoth::Left(&x) => x,
                EitherOrBoth::Right(&y) => f.neg(y),
            })
            .collect();
        self.wrap_vector(coeffs)
    }

    /// Scales every coefficient by a constant.
    pub fn mul_poly_by_constant(&self, a: &FieldVector, c: u128) -> FieldVector {
        self.elementwise_vs(ElementOp::Mul, a, c)
    }

    /// Schoolbook convolution; the result has length `a.len + b.len - 1`
    /// (empty if either operand is empty).
    pub fn mul_polys(&self, a: &FieldVector, b: &FieldVector) -> FieldVector {
        let (a, b) = (a.to_values(), b.to_values());
        if a.is_empty() || b.is_empty() {
            return self.wrap_vector(Vec::new());
        }
        let f = &self.field;
        let mut out = vec![0u128; a.len() + b.len() - 1];
        for (i, &x) in a.iter().enumerate() {
            if x == 0 {
                continue;
            }
            for (j, &y) in b.iter().enumerate() {
                out[i + j] = f.add(out[i + j], f.mul(x, y));
            }
        }
        self.wrap_vector(out)
    }

    /// Quotient of polynomial long division, of length
    /// `deg(a) - deg(b) + 1`.
    ///
    /// The dividend must be at least as long as the divisor, and the divisor
    /// must not be the zero polynomial. The remainder is discarded; callers
    /// that need it can reconstruct it as `a - q*b`.
    pub fn div_polys(&self, a: &FieldVector, b: &FieldVector) -> Result<FieldVector> {
        if a.len() < b.len() {
            return Err(FieldError::InvalidArgument(format!(
                "dividend of length {} is shorter than divisor of length {}",
                a.len(),
                b.len()
            )));
        }
        let (a, b) = (a.to_values(), b.to_values());
        let Some(bpos) = last_nonzero(b) else {
            return Err(FieldError::InvalidArgument(
                "division by the zero polynomial".into(),
            ));
        };
        let Some(apos) = last_nonzero(a) else {
            return Ok(self.wrap_vector(vec![0]));
        };
        if apos < bpos {
            return Ok(self.wrap_vector(vec![0]));
        }

        let f = &self.field;
        let diff = apos - bpos;
        let mut rem = a.to_vec();
        let mut quotient = vec![0u128; diff + 1];
        let lead_inv = f.inv(b[bpos]);
        for i in (0..=diff).rev() {
            let q = f.mul(rem[bpos + i], lead_inv);
            quotient[i] = q;
            if q != 0 {
                for (j, &bc) in b[..=bpos].iter().enumerate() {
                    rem[i + j] = f.sub(rem[i + j], f.mul(q, bc));
                }
            }
        }
        Ok(self.wrap_vector(quotient))
    }

    /// Horner evaluation at a point.
    pub fn eval_poly_at(&self, poly: &FieldVector, x: u128) -> u128 {
        eval_at(&self.field, poly.to_values(), x)
    }

    /// The vanishing polynomial `z(x) = prod (x - x_i)`, of length
    /// `xs.len() + 1` with leading coefficient 1.
    pub fn vanishing_poly(&self, xs: &FieldVector) -> FieldVector {
        let f = &self.field;
        let k = xs.len();
        let mut coeffs = vec![0u128; k + 1];
        coeffs[k] = 1;
        // Multiply one linear factor in at a time; the live coefficients
        // occupy a shrinking suffix of the buffer, so each factor only
        // touches entries below the current leading 1.
        for (i, &xi) in xs.to_values().iter().enumerate() {
            for j in k - 1 - i..k {
                let t = f.mul(coeffs[j + 1], xi);
                coeffs[j] = f.sub(coeffs[j], t);
            }
        }
        self.wrap_vector(coeffs)
    }

    /// Lagrange interpolation over an arbitrary set of distinct
    /// x-coordinates. Returns the unique polynomial of length `xs.len()`
    /// (degree below it) passing through all the points.
    ///
    /// All denominator inversions are funneled through a single Montgomery
    /// batch.
    pub fn interpolate(&self, xs: &FieldVector, ys: &FieldVector) -> Result<FieldVector> {
        if xs.len() != ys.len() {
            return Err(FieldError::DimensionMismatch(format!(
                "{} x-coordinates but {} y-coordinates",
                xs.len(),
                ys.len()
            )));
        }
        let k = xs.len();
        if k == 0 {
            return Ok(self.wrap_vector(Vec::new()));
        }

        let f = &self.field;
        let root = self.vanishing_poly(xs);

        // numerator_i = root / (x - x_i), exact by construction.
        let numerators: Vec<Vec<u128>> = xs
            .to_values()
            .iter()
            .map(|&xi| divide_by_linear(f, root.to_values(), xi))
            .collect();
        let denominators: Vec<u128> = numerators
            .iter()
            .zip(xs.to_values())
            .map(|(num, &xi)| eval_at(f, num, xi))
            .collect();
        let inverses = self.engine.batch_inverse(f, &denominators);

        let mut out = vec![0u128; k];
        for (num, &inv_i, &y_i) in izip!(&numerators, &inverses, ys.to_values()) {
            let scale = f.mul(y_i, inv_i);
            if scale == 0 {
                continue;
            }
            for (o, &c) in out.iter_mut().zip(num) {
                *o = f.add(*o, f.mul(scale, c));
            }
        }
        Ok(self.wrap_vector(out))
    }

    /// Interpolates a batch of cubic polynomials, each through the four
    /// points given by one row of `x_sets`/`y_sets`.
    ///
    /// The cubics `eq_k = prod_{j != k} (x - x_j)` are built in expanded form
    /// from shared pair products, and the `4 * rows` denominators
    /// `eq_k(x_k)` go through one Montgomery batch inversion. That single
    /// inversion amortized across the whole batch is the point of the
    /// routine.
    pub fn interpolate_quartic_batch(
        &self,
        x_sets: &FieldMatrix,
        y_sets: &FieldMatrix,
    ) -> Result<FieldMatrix> {
        if x_sets.col_count() != 4 || y_sets.col_count() != 4 {
            return Err(FieldError::InvalidArgument(format!(
                "quartic batches take 4 columns, got {} and {}",
                x_sets.col_count(),
                y_sets.col_count()
            )));
        }
        if x_sets.row_count() != y_sets.row_count() {
            return Err(FieldError::DimensionMismatch(format!(
                "{} rows of x-coordinates but {} rows of y-coordinates",
                x_sets.row_count(),
                y_sets.row_count()
            )));
        }

        let f = &self.field;
        let rows = x_sets.row_count();
        let mut equations = Vec::with_capacity(rows);
        let mut denominators = Vec::with_capacity(rows * 4);
        for r in 0..rows {
            let x = x_sets.row(r);
            let x01 = f.mul(x[0], x[1]);
            let x02 = f.mul(x[0], x[2]);
            let x03 = f.mul(x[0], x[3]);
            let x12 = f.mul(x[1], x[2]);
            let x13 = f.mul(x[1], x[3]);
            let x23 = f.mul(x[2], x[3]);

            let eqs: [[u128; 4]; 4] = [
                [
                    f.neg(f.mul(x12, x[3])),
                    f.add(f.add(x12, x13), x23),
                    f.neg(f.add(f.add(x[1], x[2]), x[3])),
                    1,
                ],
                [
                    f.neg(f.mul(x02, x[3])),
                    f.add(f.add(x02, x03), x23),
                    f.neg(f.add(f.add(x[0], x[2]), x[3])),
                    1,
                ],
                [
                    f.neg(f.mul(x01, x[3])),
                    f.add(f.add(x01, x03), x13),
                    f.neg(f.add(f.add(x[0], x[1]), x[3])),
                    1,
                ],
                [
                    f.neg(f.mul(x01, x[2])),
                    f.add(f.add(x01, x02), x12),
                    f.neg(f.add(f.add(x[0], x[1]), x[2])),
                    1,
                ],
            ];
            for k in 0..4 {
                denominators.push(eval_at(f, &eqs[k], x[k]));
            }
            equations.push(eqs);
        }

        let inverses = self.engine.batch_inverse(f, &denominators);

        let mut out = Vec::with_capacity(rows * 4);
        for (r, eqs) in equations.iter().enumerate() {
            let row_out =
                accumulate_quartic(f, eqs, y_sets.row(r), &inverses[r * 4..(r + 1) * 4]);
            out.extend_from_slice(&row_out);
        }
        Ok(FieldMatrix::new(rows, 4, out, self.element_size()))
    }
}

/// One row of the quartic batch: `sum_k y_k * inv_k * eq_k`, fully unrolled
/// over the fixed 4x4 shape.
#[unroll_for_loops]
fn accumulate_quartic(
    f: &PrimeField128,
    eqs: &[[u128; 4]; 4],
    y: &[u128],
    inverses: &[u128],
) -> [u128; 4] {
    let mut row_out = [0u128; 4];
    for k in 0..4 {
        let scale = f.mul(y[k], inverses[k]);
        for j in 0..4 {
            row_out[j] = f.add(row_out[j], f.mul(scale, eqs[k][j]));
        }
    }
    row_out
}

fn last_nonzero(coeffs: &[u128]) -> Option<usize> {
    coeffs.iter().rposition(|&c| c != 0)
}

/// Horner's rule from the high coefficient down, with specializations for
/// lengths 0 through 5 that skip the loop overhead.
pub(crate) fn eval_at(f: &PrimeField128, coeffs: &[u128], x: u128) -> u128 {
    match coeffs {
        [] => 0,
        [c0] => f.canonical(*c0),
        [c0, c1] => f.add(*c0, f.mul(*c1, x)),
        [c0, c1, c2] => f.add(*c0, f.mul(x, f.add(*c1, f.mul(*c2, x)))),
        [c0, c1, c2, c3] => f.add(
            *c0,
            f.mul(x, f.add(*c1, f.mul(x, f.add(*c2, f.mul(*c3, x))))),
        ),
        [c0, c1, c2, c3, c4] => f.add(
            *c0,
            f.mul(
                x,
                f.add(*c1, f.mul(x, f.add(*c2, f.mul(x, f.add(*c3, f.mul(*c4, x)))))),
            ),
        ),
        _ => coeffs
            .iter()
            .rev()
            .fold(0, |acc, &c| f.add(f.mul(acc, x), c)),
    }
}

/// Let `p = self`; returns `(p(x) - p(z)) / (x - z)` by synthetic division.
/// When `z` is a root of `p` this is the exact quotient.
fn divide_by_linear(f: &PrimeField128, coeffs: &[u128], z: u128) -> Vec<u128> {
    let mut bs = coeffs
        .iter()
        .rev()
        .scan(0u128, |acc, &c| {
            *acc = f.add(f.mul(*acc, z), c);
            Some(*acc)
        })
        .collect::<Vec<_>>();
    bs.pop();
    bs.reverse();
    bs
}
