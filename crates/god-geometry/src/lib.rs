//! GOD Geometry
//!
//! Pure helpers for placing and resampling 2D grayscale images.
//!
//! # Core Concepts
//!
//! - [`center_window`]: the centring rule shared by cropping and canvas placement
//! - [`square_crop`]: centred square sub-view of side `min(rows, cols)`
//! - [`resize`]: separable cubic B-spline resampling with edge extension
//! - [`paste_centered`] / [`canvas`]: place an image in the middle of a larger array
//!
//! # Example
//!
//! ```rust,ignore
//! use god_geometry::{canvas, resize, square_crop};
//!
//! let cropped = square_crop(image.view());
//! let resized = resize(cropped, 500, 500)?;
//! let stimulus = canvas(resized.view(), 550, 0.5)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod crop;
mod error;
mod polar;
mod resize;
mod window;

pub use crop::{canvas, expand, paste_centered, square_crop};
pub use error::{GeometryError, Result};
pub use polar::{cart2pol, pol2cart};
pub use resize::resize;
pub use window::{center_window, center_window_2d, index_middle};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use ndarray::Array2;

    fn ramp(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f32 / (rows * cols) as f32)
    }

    #[test]
    fn crop_resize_paste_is_identity_at_target_size() {
        for side in [7usize, 8] {
            let image = ramp(side, side);
            let cropped = square_crop(image.view());
            let resized = resize(cropped, side, side).unwrap();
            let placed = canvas(resized.view(), side + 5, 0.5).unwrap();

            let (rows, cols) = center_window_2d((side + 5, side + 5), side).unwrap();
            let inner = placed.slice(ndarray::s![rows, cols]);
            for (a, b) in inner.iter().zip(image.iter()) {
                assert!((a - b).abs() < 1e-6, "{a} != {b}");
            }
        }
    }

    #[test]
    fn crop_of_landscape_keeps_middle_columns() {
        let image = ramp(4, 7);
        let cropped = square_crop(image.view());
        assert_eq!(cropped.dim(), (4, 4));
        // center_window(7, 4) == 1..5
        assert_eq!(cropped[[0, 0]], image[[0, 1]]);
        assert_eq!(cropped[[3, 3]], image[[3, 4]]);
    }
}
