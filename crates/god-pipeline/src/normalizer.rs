//! Stimulus normalization: square crop, resize, place on a gray canvas

use crate::error::{ConfigError, NormalizeError};
use god_archive::RawImage;
use god_geometry::{canvas, resize, square_crop};
use god_records::{encode_png16, RecordResult};
use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

/// Side of the resized image content, in pixels
pub const INNER_PX: usize = 500;
/// Side of the canvas the content is placed on, in pixels
pub const CANVAS_PX: usize = 550;
/// Visual angle spanned by the image content, in degrees
pub const STIMULUS_DEGREES: f64 = 12.0;
/// Canvas fill value
pub const BACKGROUND: f32 = 0.5;

/// Presentation geometry of the stimuli
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusGeometry {
    /// Side of the image content
    pub inner_px: usize,
    /// Side of the canvas
    pub canvas_px: usize,
    /// Visual angle of `inner_px`
    pub degrees: f64,
}

impl StimulusGeometry {
    /// Create geometry with the default visual angle
    #[inline]
    #[must_use]
    pub fn new(inner_px: usize, canvas_px: usize) -> Self {
        Self {
            inner_px,
            canvas_px,
            degrees: STIMULUS_DEGREES,
        }
    }

    /// With visual angle of the image content
    #[inline]
    #[must_use]
    pub fn with_degrees(mut self, degrees: f64) -> Self {
        self.degrees = degrees;
        self
    }

    /// Pixels per degree of visual angle
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn px_per_degree(&self) -> f64 {
        self.inner_px as f64 / self.degrees
    }

    /// Degrees of visual angle per pixel
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn degrees_per_px(&self) -> f64 {
        self.degrees / self.inner_px as f64
    }

    /// Visual angle spanned by the whole canvas
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn canvas_degrees(&self) -> f64 {
        self.canvas_px as f64 * self.degrees_per_px()
    }

    /// Check the sizes are usable
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if `inner_px` is zero, exceeds
    /// `canvas_px`, or `degrees` is not a positive finite number
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inner_px == 0 {
            return Err(ConfigError::invalid("geometry.inner_px", "must be positive"));
        }
        if self.inner_px > self.canvas_px {
            return Err(ConfigError::invalid(
                "geometry.inner_px",
                format!("{} exceeds canvas size {}", self.inner_px, self.canvas_px),
            ));
        }
        if !(self.degrees.is_finite() && self.degrees > 0.0) {
            return Err(ConfigError::invalid(
                "geometry.degrees",
                format!("{} is not a positive angle", self.degrees),
            ));
        }
        Ok(())
    }
}

impl Default for StimulusGeometry {
    fn default() -> Self {
        Self::new(INNER_PX, CANVAS_PX)
    }
}

/// `canvas x canvas x 1` stimulus tensor
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(Array3<f32>);

impl NormalizedTensor {
    /// Canvas side
    #[inline]
    #[must_use]
    pub fn side(&self) -> usize {
        self.0.shape()[0]
    }

    /// Full tensor including the channel axis
    #[inline]
    #[must_use]
    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.0.view()
    }

    /// The single channel as a 2D image
    #[inline]
    #[must_use]
    pub fn image(&self) -> ArrayView2<'_, f32> {
        self.0.index_axis(Axis(2), 0)
    }

    /// 16-bit grayscale PNG of the tensor
    ///
    /// # Errors
    /// Returns the codec error if encoding fails
    pub fn to_png16(&self) -> RecordResult<Vec<u8>> {
        encode_png16(self.image())
    }

    /// Take the tensor
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Array3<f32> {
        self.0
    }
}

/// Turns decoded images into fixed-geometry stimulus tensors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    geometry: StimulusGeometry,
    background: f32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(StimulusGeometry::default())
    }
}

impl Normalizer {
    /// Create normalizer for `geometry` on a mid-gray canvas
    #[inline]
    #[must_use]
    pub fn new(geometry: StimulusGeometry) -> Self {
        Self {
            geometry,
            background: BACKGROUND,
        }
    }

    /// With canvas fill value
    #[inline]
    #[must_use]
    pub fn with_background(mut self, background: f32) -> Self {
        self.background = background;
        self
    }

    /// Geometry in use
    #[inline]
    #[must_use]
    pub fn geometry(&self) -> &StimulusGeometry {
        &self.geometry
    }

    /// Crop to the centred square, resize to `inner_px`, centre on the canvas
    ///
    /// # Errors
    /// - [`NormalizeError::Geometry`] for empty images or unusable sizes
    /// - [`NormalizeError::NonFinite`] if any output pixel is NaN or infinite
    pub fn normalize(&self, raw: &RawImage) -> Result<NormalizedTensor, NormalizeError> {
        let inner = self.geometry.inner_px;
        let cropped = square_crop(raw.view());
        let resized = resize(cropped, inner, inner)?;
        let placed = canvas(resized.view(), self.geometry.canvas_px, self.background)?;

        let count = placed.iter().filter(|v| !v.is_finite()).count();
        if count > 0 {
            return Err(NormalizeError::NonFinite { count });
        }
        Ok(NormalizedTensor(placed.insert_axis(Axis(2))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use god_geometry::{center_window, GeometryError};
    use ndarray::{s, Array2};
    use proptest::prelude::*;

    fn raw(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f32) -> RawImage {
        RawImage::from_pixels(Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)))
    }

    #[test]
    fn default_geometry_shape() {
        let tensor = Normalizer::default()
            .normalize(&raw(40, 60, |_, _| 0.2))
            .unwrap();
        assert_eq!(tensor.view().shape(), &[550, 550, 1]);
        assert_eq!(tensor.side(), 550);
        let inner = tensor.image().slice(s![25..525, 25..525]).to_owned();
        assert!(inner.iter().all(|&v| (v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn identity_when_square_input_matches_inner_size() {
        for side in [7usize, 8] {
            let normalizer = Normalizer::new(StimulusGeometry::new(side, side + 3));
            let image = raw(side, side, |r, c| ((r * side + c) % 5) as f32 / 4.0);
            let tensor = normalizer.normalize(&image).unwrap();
            let window = center_window(side + 3, side).unwrap();
            let inner = tensor.image().slice(s![window.clone(), window]).to_owned();
            for (a, b) in inner.iter().zip(image.view().iter()) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let image = raw(4, 4, |r, c| if (r, c) == (1, 1) { f32::NAN } else { 0.3 });
        let err = Normalizer::new(StimulusGeometry::new(4, 6))
            .normalize(&image)
            .unwrap_err();
        assert!(matches!(err, NormalizeError::NonFinite { .. }));
    }

    #[test]
    fn empty_image_is_a_geometry_error() {
        let err = Normalizer::default()
            .normalize(&RawImage::from_pixels(Array2::zeros((0, 5))))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::Geometry(GeometryError::EmptyImage { .. })));
    }

    #[test]
    fn visual_angle_conversions() {
        let geometry = StimulusGeometry::default();
        assert!((geometry.px_per_degree() - 500.0 / 12.0).abs() < 1e-12);
        assert!((geometry.degrees_per_px() * geometry.px_per_degree() - 1.0).abs() < 1e-12);
        assert!((geometry.canvas_degrees() - 13.2).abs() < 1e-9);
    }

    #[test]
    fn geometry_validation() {
        assert!(StimulusGeometry::default().validate().is_ok());
        assert!(StimulusGeometry::new(0, 10).validate().is_err());
        assert!(StimulusGeometry::new(11, 10).validate().is_err());
        assert!(StimulusGeometry::new(10, 10).with_degrees(0.0).validate().is_err());
    }

    proptest! {
        #[test]
        fn background_is_exactly_mid_gray(
            rows in 1usize..24,
            cols in 1usize..24,
            inner in 1usize..16,
            margin in 0usize..9,
        ) {
            let canvas_px = inner + margin;
            let image = raw(rows, cols, |r, c| ((r * 7 + c * 3) % 11) as f32 / 10.0);
            let tensor = Normalizer::new(StimulusGeometry::new(inner, canvas_px))
                .normalize(&image)
                .unwrap();
            let window = center_window(canvas_px, inner).unwrap();
            for ((r, c), &v) in tensor.image().indexed_iter() {
                let inside = window.contains(&r) && window.contains(&c);
                if !inside {
                    prop_assert_eq!(v, 0.5);
                }
            }
        }
    }
}
