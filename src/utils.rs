pub(crate) const fn div_ceil(lhs: usize, rhs: usize) -> usize {
    let d = lhs / rhs;
    let r = lhs % rhs;
    if r > 0 && rhs > 0 {
        d + 1
    } else {
        d
    }
}

/// Overwrites the `n` bit wide field at `dst_offset` in `dst` with the `n`
/// bits found at `src_offset` in `src`. Offsets count from the most
/// significant bit, the order PNG packs sub-byte samples in. All other bits
/// of `dst` are left as they were.
///
/// `n` must be in `1..=8` and each offset plus `n` must not exceed 8.
pub(crate) fn copy_bits(dst: &mut u8, src: u8, dst_offset: u32, src_offset: u32, n: u32) {
    debug_assert!((1..=8).contains(&n));
    debug_assert!(dst_offset + n <= 8 && src_offset + n <= 8);
    let mask = (0xffu8 << (8 - n)) >> dst_offset;
    let field = (src << src_offset) >> dst_offset;
    *dst = (*dst & !mask) | (field & mask);
}
