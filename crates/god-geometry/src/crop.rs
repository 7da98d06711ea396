//! Cropping and canvas placement

use crate::error::{GeometryError, Result};
use crate::window::{center_window, index_middle};
use ndarray::{s, Array2, ArrayView2, ArrayViewMut2};

/// Centred square sub-view of side `min(rows, cols)`
///
/// Follows the [`center_window`] rule on the longer axis. The result is a view
/// into `image`; no pixels are copied.
#[must_use]
pub fn square_crop(image: ArrayView2<'_, f32>) -> ArrayView2<'_, f32> {
    let (rows, cols) = image.dim();
    let side = rows.min(cols);
    // side <= both axes, the windows always fit
    let r = rows / 2 - side / 2;
    let c = cols / 2 - side / 2;
    image.slice_move(s![r..r + side, c..c + side])
}

/// Write `image` into the centre of `target`
///
/// Placement uses [`center_window`] on each axis independently.
///
/// # Errors
/// Returns [`GeometryError::WindowTooLarge`] if `image` is larger than `target`
/// along either axis.
pub fn paste_centered(target: &mut ArrayViewMut2<'_, f32>, image: ArrayView2<'_, f32>) -> Result<()> {
    let rows = center_window(target.nrows(), image.nrows())?;
    let cols = center_window(target.ncols(), image.ncols())?;
    target.slice_mut(s![rows, cols]).assign(&image);
    Ok(())
}

/// Square `side x side` array filled with `background`, with `image` centred in it
///
/// # Errors
/// Returns [`GeometryError::WindowTooLarge`] if `image` does not fit
pub fn canvas(image: ArrayView2<'_, f32>, side: usize, background: f32) -> Result<Array2<f32>> {
    let mut out = Array2::from_elem((side, side), background);
    paste_centered(&mut out.view_mut(), image)?;
    Ok(out)
}

/// Expand a 2D image to `rows x cols`, filling the border with `gray`
///
/// Unlike [`canvas`], placement follows [`index_middle`] and the target may be
/// rectangular.
///
/// # Errors
/// Returns [`GeometryError::TargetTooSmall`] if the target is smaller than the
/// image along either axis.
pub fn expand(image: ArrayView2<'_, f32>, rows: usize, cols: usize, gray: f32) -> Result<Array2<f32>> {
    let (h, w) = image.dim();
    if rows < h || cols < w {
        return Err(GeometryError::TargetTooSmall {
            rows: h,
            cols: w,
            target_rows: rows,
            target_cols: cols,
        });
    }
    let mut out = Array2::from_elem((rows, cols), gray);
    let r = index_middle(rows, h)?;
    let c = index_middle(cols, w)?;
    out.slice_mut(s![r, c]).assign(&image);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn square_crop_of_square_is_whole_image() {
        let image = Array2::<f32>::ones((5, 5));
        assert_eq!(square_crop(image.view()).dim(), (5, 5));
    }

    #[test]
    fn square_crop_portrait() {
        let image = Array2::from_shape_fn((7, 4), |(r, _)| r as f32);
        let crop = square_crop(image.view());
        assert_eq!(crop.dim(), (4, 4));
        assert_eq!(crop[[0, 0]], 1.0);
        assert_eq!(crop[[3, 0]], 4.0);
    }

    #[test]
    fn canvas_background_untouched_outside_window() {
        let image = Array2::<f32>::zeros((3, 3));
        let out = canvas(image.view(), 8, 0.5).unwrap();
        // center_window(8, 3) == 3..6
        for ((r, c), v) in out.indexed_iter() {
            let inside = (3..6).contains(&r) && (3..6).contains(&c);
            if inside {
                assert_eq!(*v, 0.0);
            } else {
                assert_eq!(*v, 0.5);
            }
        }
    }

    #[test]
    fn canvas_rejects_oversized_image() {
        let image = Array2::<f32>::zeros((4, 4));
        assert!(canvas(image.view(), 3, 0.5).is_err());
    }

    #[test]
    fn expand_uses_truncating_middle() {
        let image = array![[1.0f32, 2.0, 3.0]];
        let out = expand(image.view(), 1, 6, 0.0).unwrap();
        // index_middle(6, 3) == 1..4
        assert_eq!(out, array![[0.0f32, 1.0, 2.0, 3.0, 0.0, 0.0]]);
    }

    #[test]
    fn expand_rejects_smaller_target() {
        let image = Array2::<f32>::zeros((4, 4));
        assert_eq!(
            expand(image.view(), 3, 6, 0.5),
            Err(GeometryError::TargetTooSmall {
                rows: 4,
                cols: 4,
                target_rows: 3,
                target_cols: 6,
            })
        );
    }
}
