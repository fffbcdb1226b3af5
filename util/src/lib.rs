#![allow(clippy::needless_range_loop)]

/// Number of significant bits in `n`, i.e. `floor(log2(n)) + 1` for nonzero `n`.
pub fn bits_u128(n: u128) -> usize {
    (128 - n.leading_zeros()) as usize
}

pub const fn ceil_div_usize(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Computes `ceil(log_2(n))`.
#[must_use]
pub fn log2_ceil(n: usize) -> usize {
    (usize::BITS - n.saturating_sub(1).leading_zeros()) as usize
}

/// Computes `log_2(n)`, panicking if `n` is not a power of two.
pub fn log2_strict(n: usize) -> usize {
    let res = n.trailing_zeros();
    assert!(n.wrapping_shr(res) == 1, "Not a power of two: {n}");
    res as usize
}

/// Permutes `arr` such that each index is mapped to its reverse in binary.
///
/// This is the input permutation of the decimation-in-time FFT.
pub fn reverse_index_bits_in_place<T>(arr: &mut [T]) {
    let n = arr.len();
    let lb_n = log2_strict(n);
    for src in 0..n {
        // `wrapping_shr` handles the case when `arr.len() == 1`. In that case
        // `src == 0`, so `src.reverse_bits() == 0`, and the no-op shift by the
        // full word width still gives the correct result.
        let dst = src.reverse_bits().wrapping_shr(usize::BITS - lb_n as u32);
        if src < dst {
            arr.swap(src, dst);
        }
    }
}
