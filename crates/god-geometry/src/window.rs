//! Centering windows along an axis
//!
//! Two rounding rules are in use and they are not interchangeable:
//!
//! - [`center_window`] starts at `floor(len / 2) + ceil(-n / 2)`. This is the
//!   rule used for square cropping and for canvas placement of stimuli.
//! - [`index_middle`] truncates `len / 2 - n / 2`. It is used when padding or
//!   trimming filter kernels.
//!
//! The two agree unless `len` is even and `n` is odd.

use crate::error::{GeometryError, Result};
use std::ops::Range;

/// Window of length `n` centred in an axis of length `len`
///
/// When `len - n` is odd the leftover pixel lands after the window for even
/// `n` (`center_window(7, 4) == 1..5`) and before it for odd `n`
/// (`center_window(8, 3) == 3..6`).
///
/// # Errors
/// Returns [`GeometryError::WindowTooLarge`] if `n > len`
#[inline]
pub fn center_window(len: usize, n: usize) -> Result<Range<usize>> {
    if n > len {
        return Err(GeometryError::WindowTooLarge { len, n });
    }
    let start = len / 2 - n / 2;
    Ok(start..start + n)
}

/// Square `n x n` window centred in a 2D shape
///
/// # Errors
/// Returns [`GeometryError::WindowTooLarge`] if `n` exceeds either axis
#[inline]
pub fn center_window_2d(shape: (usize, usize), n: usize) -> Result<(Range<usize>, Range<usize>)> {
    Ok((center_window(shape.0, n)?, center_window(shape.1, n)?))
}

/// Central slice of length `n` computed by truncating `len / 2 - n / 2`
///
/// # Errors
/// Returns [`GeometryError::WindowTooLarge`] if `n > len`
#[inline]
pub fn index_middle(len: usize, n: usize) -> Result<Range<usize>> {
    if n > len {
        return Err(GeometryError::WindowTooLarge { len, n });
    }
    let start = (len - n) / 2;
    Ok(start..start + n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn floor_ceil_rule_examples() {
        assert_eq!(center_window(7, 4).unwrap(), 1..5);
        assert_eq!(center_window(8, 3).unwrap(), 3..6);
        assert_eq!(center_window(550, 500).unwrap(), 25..525);
    }

    #[test]
    fn full_and_empty_windows() {
        assert_eq!(center_window(5, 5).unwrap(), 0..5);
        assert_eq!(center_window(6, 0).unwrap(), 3..3);
    }

    #[test]
    fn oversized_window_rejected() {
        assert_eq!(
            center_window(3, 4),
            Err(GeometryError::WindowTooLarge { len: 3, n: 4 })
        );
        assert!(index_middle(3, 4).is_err());
    }

    #[test]
    fn middle_differs_for_even_len_odd_n() {
        assert_eq!(index_middle(8, 3).unwrap(), 2..5);
        assert_eq!(center_window(8, 3).unwrap(), 3..6);
        assert_eq!(index_middle(7, 4).unwrap(), center_window(7, 4).unwrap());
    }

    proptest! {
        #[test]
        fn window_has_requested_length(len in 0usize..2000, frac in 0.0f64..=1.0) {
            let n = (len as f64 * frac) as usize;
            let w = center_window(len, n).unwrap();
            prop_assert_eq!(w.len(), n);
            prop_assert!(w.end <= len);
            let m = index_middle(len, n).unwrap();
            prop_assert_eq!(m.len(), n);
            prop_assert!(m.end <= len);
        }

        #[test]
        fn leading_gap_never_exceeds_trailing_gap_by_more_than_one(len in 0usize..2000, frac in 0.0f64..=1.0) {
            let n = (len as f64 * frac) as usize;
            let w = center_window(len, n).unwrap();
            let before = w.start;
            let after = len - w.end;
            prop_assert!(before.abs_diff(after) <= 1);
        }
    }
}
