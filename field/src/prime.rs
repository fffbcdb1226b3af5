use std::fmt;
use std::fmt::{Display, Formatter};

use gf128_util::{bits_u128, ceil_div_usize};
use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::arith;
use crate::errors::{FieldError, Result};

/// How many candidate generator bases the root-of-unity search tries before
/// concluding the field has no root of the requested order.
const ROOT_SEARCH_BOUND: u128 = 1024;

/// An immutable prime-field description: the modulus and the layout facts
/// derived from it.
///
/// Instances are created once and shared read-only; every operation takes
/// `&self` and the struct is never mutated. Elements are canonical `u128`
/// values in `[0, p)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimeField128 {
    modulus: u128,
    bits: usize,
    element_size: usize,
}

impl PrimeField128 {
    pub const ZERO: u128 = 0;
    pub const ONE: u128 = 1;

    /// Builds the field GF(p) for a prime `p`. Primality is the caller's
    /// responsibility; a composite modulus makes inverses meaningless.
    pub fn new(modulus: u128) -> Self {
        assert!(modulus > 1, "modulus must be a prime, got {modulus}");
        let bits = bits_u128(modulus);
        Self {
            modulus,
            bits,
            element_size: ceil_div_usize(bits, 8),
        }
    }

    pub fn modulus(&self) -> u128 {
        self.modulus
    }

    /// Same as the modulus; the extension degree is fixed at 1.
    pub fn characteristic(&self) -> u128 {
        self.modulus
    }

    pub fn extension_degree(&self) -> usize {
        1
    }

    /// Bit length of the modulus.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Bytes needed to store one canonical element: `ceil(bits / 8)`.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Brings an arbitrary 128-bit operand into canonical range. Cheap for
    /// values that already are.
    #[inline]
    pub fn canonical(&self, x: u128) -> u128 {
        if x < self.modulus {
            x
        } else {
            x % self.modulus
        }
    }

    #[inline]
    pub fn add(&self, x: u128, y: u128) -> u128 {
        arith::add_mod(self.canonical(x), self.canonical(y), self.modulus)
    }

    #[inline]
    pub fn sub(&self, x: u128, y: u128) -> u128 {
        arith::sub_mod(self.canonical(x), self.canonical(y), self.modulus)
    }

    #[inline]
    pub fn mul(&self, x: u128, y: u128) -> u128 {
        arith::mul_mod(self.canonical(x), self.canonical(y), self.modulus)
    }

    /// `x * inv(y)`; with the `inv(0) = 0` convention, dividing by zero
    /// yields zero rather than an error.
    #[inline]
    pub fn div(&self, x: u128, y: u128) -> u128 {
        self.mul(x, self.inv(y))
    }

    /// Multiplicative inverse, with `inv(0) = 0` by convention.
    #[inline]
    pub fn inv(&self, x: u128) -> u128 {
        arith::inverse_mod(self.canonical(x), self.modulus)
    }

    #[inline]
    pub fn neg(&self, x: u128) -> u128 {
        let x = self.canonical(x);
        if x == 0 {
            0
        } else {
            self.modulus - x
        }
    }

    /// `b^e` by right-to-left square-and-multiply.
    ///
    /// `b^0 = 1` for nonzero `b`, `0^e = 0` for positive `e`, and `exp(0, 0)`
    /// is rejected.
    pub fn exp(&self, b: u128, e: u128) -> Result<u128> {
        let b = self.canonical(b);
        if b == 0 && e == 0 {
            return Err(FieldError::InvalidArgument(
                "exp(0, 0) is undefined".into(),
            ));
        }
        Ok(arith::pow_mod(b, e, self.modulus))
    }

    /// `exp` extended to negative exponents: `b^-e = inv(b)^e`.
    pub fn exp_signed(&self, b: u128, e: i128) -> Result<u128> {
        if e < 0 {
            self.exp(self.inv(b), e.unsigned_abs())
        } else {
            self.exp(b, e as u128)
        }
    }

    /// An iterator over `start, start * base, start * base^2, ...`.
    pub fn powers(&self, base: u128) -> Powers<'_> {
        Powers {
            field: self,
            base: self.canonical(base),
            current: 1,
        }
    }

    /// A uniformly random canonical element: `element_size` bytes from the
    /// OS entropy source, reduced mod p.
    pub fn rand(&self) -> u128 {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes[..self.element_size]);
        self.canonical(u128::from_le_bytes(bytes))
    }

    /// Deterministic element derived from `seed`: `sha256(seed) mod p`.
    pub fn prng(&self, seed: &[u8]) -> u128 {
        let digest: [u8; 32] = Sha256::digest(seed).into();
        self.reduce_digest(&digest)
    }

    /// Deterministic sequence derived from `seed` by repeated hashing:
    /// element `i` is `sha256^(i+1)(seed) mod p`, so the first element
    /// equals `prng(seed)`.
    pub fn prng_sequence(&self, seed: &[u8], n: usize) -> Vec<u128> {
        let mut state: [u8; 32] = Sha256::digest(seed).into();
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.reduce_digest(&state));
            state = Sha256::digest(state).into();
        }
        out
    }

    /// Reduces a 256-bit little-endian digest through the wide reduction.
    fn reduce_digest(&self, digest: &[u8; 32]) -> u128 {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = u64::from_le_bytes(digest[i * 8..(i + 1) * 8].try_into().unwrap());
        }
        arith::reduce_wide(limbs, self.modulus)
    }

    /// Serializes a canonical element as `element_size` little-endian bytes.
    pub fn element_to_bytes(&self, x: u128) -> Vec<u8> {
        self.canonical(x).to_le_bytes()[..self.element_size].to_vec()
    }

    /// Parses `element_size` little-endian bytes, reducing into canonical
    /// range.
    pub fn element_from_bytes(&self, bytes: &[u8]) -> Result<u128> {
        if bytes.len() != self.element_size {
            return Err(FieldError::InvalidArgument(format!(
                "expected {} element bytes, got {}",
                self.element_size,
                bytes.len()
            )));
        }
        let mut buf = [0u8; 16];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(self.canonical(u128::from_le_bytes(buf)))
    }

    /// Finds a root of unity of the given order: the smallest candidate base
    /// `i = 2, 3, ...` for which `g = i^((p-1)/order)` satisfies
    /// `g^order = 1` and `g^(order/2) != 1`.
    ///
    /// `order` must be a power of two. If no candidate up to the search
    /// bound produces a root, the field has none of that order.
    pub fn root_of_unity(&self, order: u128) -> Result<u128> {
        if order == 0 || !order.is_power_of_two() {
            return Err(FieldError::InvalidArgument(format!(
                "root order must be a power of two, got {order}"
            )));
        }
        let exponent = (self.modulus - 1) / order;
        for i in 2..ROOT_SEARCH_BOUND {
            let g = arith::pow_mod(i, exponent, self.modulus);
            if arith::pow_mod(g, order, self.modulus) != 1 {
                continue;
            }
            if order == 1 || arith::pow_mod(g, order / 2, self.modulus) != 1 {
                debug!("root of unity of order {order}: {g} (base {i})");
                return Ok(g);
            }
        }
        Err(FieldError::NotFound(format!(
            "no root of unity of order {order} in GF({})",
            self.modulus
        )))
    }

    /// The power cycle `[1, w, w^2, ...]` of a nonzero element, ending just
    /// before the powers wrap back to 1.
    pub fn power_cycle(&self, root: u128) -> Result<Vec<u128>> {
        if self.canonical(root) == 0 {
            return Err(FieldError::InvalidArgument(
                "power cycle of zero never closes".into(),
            ));
        }
        let mut cycle = Vec::new();
        for power in self.powers(root) {
            if power == 1 && !cycle.is_empty() {
                break;
            }
            cycle.push(power);
        }
        Ok(cycle)
    }
}

impl Display for PrimeField128 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "GF({})", self.modulus)
    }
}

/// An iterator over the powers of a base element: `1, b, b^2, ...`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone, Debug)]
pub struct Powers<'a> {
    field: &'a PrimeField128,
    base: u128,
    current: u128,
}

impl Iterator for Powers<'_> {
    type Item = u128;

    fn next(&mut self) -> Option<u128> {
        let result = self.current;
        self.current = self.field.mul(self.current, self.base);
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
