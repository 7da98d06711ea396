//! Decoded grayscale pixels

use image::DynamicImage;
use ndarray::{Array2, ArrayView2};

/// Luminance weights for red, green and blue
pub const LUMA_WEIGHTS: [f32; 3] = [0.2125, 0.7154, 0.0721];

/// Single-channel image with intensities in `[0, 1]`
///
/// Colour images are reduced with [`LUMA_WEIGHTS`]; grayscale images keep
/// their own intensities, rescaled from their bit depth.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pixels: Array2<f32>,
}

impl RawImage {
    /// Wrap an existing `rows x cols` intensity array
    #[inline]
    #[must_use]
    pub fn from_pixels(pixels: Array2<f32>) -> Self {
        Self { pixels }
    }

    /// Decode encoded image bytes (format is sniffed)
    ///
    /// # Errors
    /// Returns the codec error if the bytes are not a supported image
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(&img))
    }

    /// Convert a decoded image to grayscale intensities
    #[must_use]
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let shape = (img.height() as usize, img.width() as usize);
        #[allow(clippy::cast_possible_truncation)]
        let pixels = if img.color().has_color() {
            let rgb = img.to_rgb32f();
            Array2::from_shape_fn(shape, |(r, c)| {
                let [red, green, blue] = rgb.get_pixel(c as u32, r as u32).0;
                (red * LUMA_WEIGHTS[0] + green * LUMA_WEIGHTS[1] + blue * LUMA_WEIGHTS[2])
                    .clamp(0.0, 1.0)
            })
        } else {
            let luma = img.to_luma16();
            Array2::from_shape_fn(shape, |(r, c)| {
                f32::from(luma.get_pixel(c as u32, r as u32).0[0]) / f32::from(u16::MAX)
            })
        };
        Self { pixels }
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.pixels.nrows()
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.pixels.ncols()
    }

    /// Borrow pixels
    #[inline]
    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.pixels.view()
    }

    /// Take pixels
    #[inline]
    #[must_use]
    pub fn into_pixels(self) -> Array2<f32> {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgb};
    use std::io::Cursor;

    fn encode(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn gray8_is_rescaled() {
        let img = image::GrayImage::from_fn(3, 2, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        let raw = RawImage::decode(&encode(DynamicImage::ImageLuma8(img))).unwrap();
        assert_eq!((raw.rows(), raw.cols()), (2, 3));
        assert_eq!(raw.view()[[1, 0]], 0.0);
        assert!((raw.view()[[1, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn colour_uses_luma_weights() {
        let img = image::RgbImage::from_pixel(2, 2, Rgb([255, 0, 0]));
        let raw = RawImage::decode(&encode(DynamicImage::ImageRgb8(img))).unwrap();
        assert!((raw.view()[[0, 0]] - LUMA_WEIGHTS[0]).abs() < 1e-5);

        let white = image::RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        let raw = RawImage::decode(&encode(DynamicImage::ImageRgb8(white))).unwrap();
        assert!((raw.view()[[0, 0]] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(RawImage::decode(b"definitely not an image").is_err());
    }
}
