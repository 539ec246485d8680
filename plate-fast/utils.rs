//! Bit tricks for the FAST segment test

/// Rotate-left on the 16-point circle mask
#[inline]
fn rotl16(mask: u16, n: usize) -> u16 {
    mask.rotate_left(n as u32)
}

/// Check whether `mask` (bit i = circle pixel i passes) holds at least
/// `min_count` set bits in a row, wrapping around the circle.
pub fn has_contiguous_run(mask: u16, min_count: usize) -> bool {
    if min_count == 0 || min_count > 16 {
        return false;
    }
    if mask == u16::MAX {
        return true;
    }

    // For a run of length n: mask & rotl(mask, 1) & ... & rotl(mask, n - 1)
    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= rotl16(mask, i);
        if test_mask == 0 {
            return false;
        }
    }

    test_mask != 0
}
