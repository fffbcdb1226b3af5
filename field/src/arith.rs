//! Wide-integer primitives backing the field kernel.
//!
//! Elements are native `u128`s; the only wider quantity is the 256-bit
//! product of a multiplication, kept as four 64-bit limbs in little-endian
//! order until it has been reduced.

use gf128_util::bits_u128;

/// Full 128x128 -> 256 bit product as four 64-bit limbs, little endian.
///
/// Schoolbook multiplication on the 64-bit halves; the cross terms are
/// accumulated in `u128` so carries never escape.
pub(crate) fn full_mul(a: u128, b: u128) -> [u64; 4] {
    let (a0, a1) = (a as u64, (a >> 64) as u64);
    let (b0, b1) = (b as u64, (b >> 64) as u64);

    let p00 = (a0 as u128) * (b0 as u128);
    let p01 = (a0 as u128) * (b1 as u128);
    let p10 = (a1 as u128) * (b0 as u128);
    let p11 = (a1 as u128) * (b1 as u128);

    let mid = (p00 >> 64) + (p01 as u64 as u128) + (p10 as u64 as u128);
    let hi = (mid >> 64) + (p01 >> 64) + (p10 >> 64) + (p11 as u64 as u128);

    [
        p00 as u64,
        mid as u64,
        hi as u64,
        ((hi >> 64) + (p11 >> 64)) as u64,
    ]
}

/// Reduces a 256-bit value (little-endian limbs) modulo `p`.
///
/// Long division one bit at a time: the high half seeds a running remainder
/// below `p`, then the low 128 bits are shifted in most-significant first.
pub(crate) fn reduce_wide(limbs: [u64; 4], p: u128) -> u128 {
    let lo = (limbs[0] as u128) | ((limbs[1] as u128) << 64);
    let hi = (limbs[2] as u128) | ((limbs[3] as u128) << 64);
    if hi == 0 {
        return lo % p;
    }

    let mut rem = hi % p;
    for i in (0..128).rev() {
        let bit = (lo >> i) & 1;
        let overflowed = rem >> 127 != 0;
        let shifted = (rem << 1) | bit;
        rem = if overflowed {
            // rem*2 + bit exceeded 2^128. Since rem < p the true value is
            // below 2p, so a single subtraction lands in [0, p); the wrap
            // cancels exactly.
            shifted.wrapping_sub(p)
        } else if shifted >= p {
            shifted - p
        } else {
            shifted
        };
    }
    rem
}

/// `x mod p` for `x < 2p`, as a single conditional subtraction.
#[inline]
pub(crate) fn reduce_once(x: u128, p: u128) -> u128 {
    if x >= p {
        x - p
    } else {
        x
    }
}

/// Modular addition of canonical operands, correct across the 2^128 carry.
#[inline]
pub(crate) fn add_mod(x: u128, y: u128, p: u128) -> u128 {
    let (sum, carried) = x.overflowing_add(y);
    if carried {
        // x + y = 2^128 + sum and is below 2p, so subtracting p once is a
        // full reduction; the wrap cancels exactly.
        sum.wrapping_sub(p)
    } else {
        reduce_once(sum, p)
    }
}

/// Modular subtraction of canonical operands; a borrow is repaid with `p`.
#[inline]
pub(crate) fn sub_mod(x: u128, y: u128, p: u128) -> u128 {
    let (diff, borrowed) = x.overflowing_sub(y);
    if borrowed {
        diff.wrapping_add(p)
    } else {
        diff
    }
}

#[inline]
pub(crate) fn mul_mod(x: u128, y: u128, p: u128) -> u128 {
    reduce_wide(full_mul(x, y), p)
}

/// Right-to-left square-and-multiply; `pow_mod(b, 0, p) = 1` for every `b`.
pub(crate) fn pow_mod(b: u128, e: u128, p: u128) -> u128 {
    let mut current = b % p;
    let mut product = 1 % p;
    for j in 0..bits_u128(e) {
        if (e >> j) & 1 != 0 {
            product = mul_mod(product, current, p);
        }
        current = mul_mod(current, current, p);
    }
    product
}

/// Modular inverse by the extended Euclidean algorithm.
///
/// By convention `inverse_mod(0, p) = 0`; batch inversion of sparse vectors
/// relies on it. For `p` prime every other operand has a true inverse.
///
/// The Bezout coefficient of `a` is tracked as a magnitude with a strictly
/// alternating sign, so no signed wide integer is needed: each new magnitude
/// bounds the `q * m` product that produced it, and all magnitudes stay at
/// or below `p`.
pub(crate) fn inverse_mod(a: u128, p: u128) -> u128 {
    let a = a % p;
    if a == 0 {
        return 0;
    }

    let (mut r0, mut r1) = (p, a);
    let (mut m0, mut m1) = (0u128, 1u128);
    let mut m1_negative = false;
    while r1 != 0 {
        let q = r0 / r1;
        (r0, r1) = (r1, r0 - q * r1);
        (m0, m1) = (m1, m0 + q * m1);
        m1_negative = !m1_negative;
    }
    debug_assert_eq!(r0, 1, "operand shares a factor with the modulus");

    // m0 pairs with the gcd in r0 and carries the sign opposite to m1's.
    let m = m0 % p;
    if m1_negative {
        m
    } else {
        p - m
    }
}
