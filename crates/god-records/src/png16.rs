//! 16-bit grayscale PNG payloads

use crate::error::{RecordError, RecordResult};
use image::{ImageBuffer, ImageFormat, Luma};
use ndarray::{Array2, ArrayView2};
use std::io::Cursor;

/// Multiplier applied before truncating intensities to 16 bits
pub const PNG16_SCALE: f32 = 65535.5;

/// Quantize one intensity in `[0, 1]` to a 16-bit level
///
/// Values are scaled, truncated toward zero, and saturated; NaN maps to 0.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize(value: f32) -> u16 {
    (value * PNG16_SCALE).clamp(0.0, f32::from(u16::MAX)) as u16
}

/// Encode a `rows x cols` intensity array as a 16-bit grayscale PNG
///
/// # Errors
/// - [`RecordError::Dimensions`] if the array is empty or too large
/// - [`RecordError::Png`] if the encoder fails
pub fn encode_png16(image: ArrayView2<'_, f32>) -> RecordResult<Vec<u8>> {
    let (rows, cols) = image.dim();
    let dims = (u32::try_from(cols), u32::try_from(rows));
    let (Ok(width), Ok(height)) = dims else {
        return Err(RecordError::Dimensions { rows, cols });
    };
    if width == 0 || height == 0 {
        return Err(RecordError::Dimensions { rows, cols });
    }

    let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([quantize(image[[y as usize, x as usize]])]));
    let mut out = Cursor::new(Vec::new());
    buffer.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Decode a PNG into intensities in `[0, 1]`
///
/// # Errors
/// Returns [`RecordError::Png`] if the bytes are not a PNG
pub fn decode_png16(bytes: &[u8]) -> RecordResult<Array2<f32>> {
    let luma = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.into_luma16();
    let shape = (luma.height() as usize, luma.width() as usize);
    #[allow(clippy::cast_possible_truncation)]
    let pixels = Array2::from_shape_fn(shape, |(r, c)| {
        f32::from(luma.get_pixel(c as u32, r as u32).0[0]) / f32::from(u16::MAX)
    });
    Ok(pixels)
}
