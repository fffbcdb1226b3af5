//! Evaluation and interpolation of polynomials over a power cycle of roots
//! of unity.
//!
//! The transform is an iterative radix-2 Cooley-Tukey FFT: bit-reverse the
//! coefficients, then run butterfly levels reading twiddles straight out of
//! the supplied cycle. Interpolation runs the same transform over the
//! reversed cycle and scales by `n^(p-2)`, the inverse of `n` by Fermat's
//! little theorem.

use gf128_util::{log2_strict, reverse_index_bits_in_place};

use crate::arith;
use crate::errors::{FieldError, Result};
use crate::field::FiniteField;
use crate::prime::PrimeField128;
use crate::vector::FieldVector;

impl FiniteField {
    /// Evaluates `poly` at every point of `roots`, the power cycle of a
    /// primitive n-th root of unity.
    ///
    /// The domain length must be a power of two at least as large as the
    /// polynomial; shorter polynomials are zero-padded up to it.
    pub fn eval_poly_at_roots(
        &self,
        poly: &FieldVector,
        roots: &FieldVector,
    ) -> Result<FieldVector> {
        let n = roots.len();
        check_domain(poly.len(), n)?;

        let mut values = poly.to_values().to_vec();
        values.resize(n, 0);
        fft_in_place(&self.field, &mut values, roots.to_values());
        Ok(self.wrap_vector(values))
    }

    /// Recovers the coefficients of the polynomial whose evaluations on the
    /// cycle `roots` are `ys`: the inverse transform.
    pub fn interpolate_roots(&self, roots: &FieldVector, ys: &FieldVector) -> Result<FieldVector> {
        let n = roots.len();
        if n == 0 || !n.is_power_of_two() {
            return Err(FieldError::InvalidDomain(format!(
                "domain length {n} is not a power of two"
            )));
        }
        if ys.len() != n {
            return Err(FieldError::DimensionMismatch(format!(
                "{} values for a domain of length {n}",
                ys.len()
            )));
        }

        // The inverse cycle: the same generator walked backwards.
        let roots = roots.to_values();
        let mut reversed = Vec::with_capacity(n);
        reversed.push(roots[0]);
        reversed.extend(roots[1..].iter().rev());

        let mut coeffs = ys.to_values().to_vec();
        fft_in_place(&self.field, &mut coeffs, &reversed);

        let p = self.field.modulus();
        let n_inv = arith::pow_mod(n as u128, p - 2, p);
        for c in &mut coeffs {
            *c = self.field.mul(*c, n_inv);
        }
        Ok(self.wrap_vector(coeffs))
    }
}

fn check_domain(poly_len: usize, domain_len: usize) -> Result<()> {
    if domain_len == 0 || !domain_len.is_power_of_two() {
        return Err(FieldError::InvalidDomain(format!(
            "domain length {domain_len} is not a power of two"
        )));
    }
    if poly_len > domain_len {
        return Err(FieldError::InvalidDomain(format!(
            "polynomial length {poly_len} exceeds domain length {domain_len}"
        )));
    }
    Ok(())
}

/// In-place decimation-in-time FFT. `roots` is the full power cycle
/// `[1, w, w^2, ...]`; the m-point butterfly level reads every (n/m)-th
/// entry of it as its twiddles.
fn fft_in_place(f: &PrimeField128, values: &mut [u128], roots: &[u128]) {
    let n = values.len();
    let lg_n = log2_strict(n);
    reverse_index_bits_in_place(values);

    for lg_half_m in 0..lg_n {
        let half_m = 1 << lg_half_m;
        let m = half_m * 2;
        let twiddle_stride = n / m;
        for k in (0..n).step_by(m) {
            for j in 0..half_m {
                let omega = roots[j * twiddle_stride];
                let t = f.mul(omega, values[k + half_m + j]);
                let u = values[k + j];
                values[k + j] = f.add(u, t);
                values[k + half_m + j] = f.sub(u, t);
            }
        }
    }
}
