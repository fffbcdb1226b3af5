//! Shared helpers for the in-crate test suites.

use rand::rngs::OsRng;
use rand::Rng;

use crate::prime::PrimeField128;

/// 2^128 - 159, the largest 128-bit prime. Its 2-adicity is 5.
pub const P128: u128 = u128::MAX - 158;

/// The Goldilocks prime 2^64 - 2^32 + 1, widened to `u128`. Its 2-adicity of
/// 32 makes it the workhorse for larger FFT domains in tests.
pub const GOLDILOCKS: u128 = 0xFFFF_FFFF_0000_0001;

/// A one-byte prime, for exercising short element encodings.
pub const SMALL_PRIME: u128 = 251;

pub fn rand_element(f: &PrimeField128) -> u128 {
    OsRng.gen_range(0..f.modulus())
}

pub fn rand_elements(f: &PrimeField128, n: usize) -> Vec<u128> {
    (0..n).map(|_| rand_element(f)).collect()
}

/// Nonzero random element.
pub fn rand_invertible(f: &PrimeField128) -> u128 {
    OsRng.gen_range(1..f.modulus())
}

/// Quantified algebraic laws from random samples: group axioms for addition
/// and multiplication, distributivity, and the exponent addition law.
pub fn check_field_laws(f: &PrimeField128) {
    for _ in 0..20 {
        let x = rand_element(f);
        let y = rand_element(f);
        let z = rand_element(f);

        // Additive group.
        assert_eq!(f.add(x, f.neg(x)), 0);
        assert_eq!(f.add(x, 0), x);
        assert_eq!(f.add(f.add(x, y), z), f.add(x, f.add(y, z)));
        assert_eq!(f.add(x, y), f.add(y, x));

        // Multiplicative group on nonzero elements.
        let w = rand_invertible(f);
        assert_eq!(f.mul(w, f.inv(w)), 1);
        assert_eq!(f.mul(x, 1), x);
        assert_eq!(f.mul(f.mul(x, y), z), f.mul(x, f.mul(y, z)));
        assert_eq!(f.mul(x, y), f.mul(y, x));
        assert_eq!(f.inv(0), 0);

        // Distributivity.
        assert_eq!(f.mul(x, f.add(y, z)), f.add(f.mul(x, y), f.mul(x, z)));

        // Division undoes multiplication.
        assert_eq!(f.div(f.mul(x, w), w), x);

        // Exponent addition law on a nonzero base.
        let a: u128 = OsRng.gen_range(0..1 << 32);
        let b: u128 = OsRng.gen_range(0..1 << 32);
        assert_eq!(
            f.exp(w, a + b).unwrap(),
            f.mul(f.exp(w, a).unwrap(), f.exp(w, b).unwrap())
        );
    }
}
