//! Separable cubic B-spline resampling
//!
//! Output pixel `o` samples input coordinate `(o + 0.5) * in / out - 0.5`.
//! Each line is extended by repeating its edge pixel, converted to
//! interpolating cubic B-spline coefficients and evaluated at the sample
//! positions. The result is clipped to the value range of the input, so
//! interpolation overshoot never leaves it.
//!
//! Intermediate values are kept in `f64`; only the final image is `f32`.

use crate::error::{GeometryError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::iter;

/// Pole of the cubic B-spline prefilter, `sqrt(3) - 2`
const POLE: f64 = -0.267_949_192_431_122_7;

/// `(1 - z)(1 - 1/z)` for [`POLE`]
const GAIN: f64 = 6.0;

/// Edge pixels repeated on each side of a line before prefiltering
const EDGE_PAD: usize = 12;

/// Terms after which `POLE^k` drops below `1e-15`
const HORIZON: usize = 27;

fn bspline(t: f64) -> f64 {
    let t = t.abs();
    if t < 1.0 {
        2.0 / 3.0 - t * t + t.powi(3) / 2.0
    } else if t < 2.0 {
        (2.0 - t).powi(3) / 6.0
    } else {
        0.0
    }
}

/// Replace samples with interpolating cubic B-spline coefficients
///
/// Causal then anticausal recursion, mirror-symmetric at both ends.
fn prefilter(c: &mut [f64]) {
    let n = c.len();
    if n < 2 {
        return;
    }
    for v in c.iter_mut() {
        *v *= GAIN;
    }

    c[0] = if n > HORIZON {
        let mut zk = 1.0;
        let mut sum = 0.0;
        for &v in &c[..HORIZON] {
            sum += zk * v;
            zk *= POLE;
        }
        sum
    } else {
        let zn = POLE.powi(i32::try_from(n - 1).unwrap_or(i32::MAX));
        let z2n = zn * zn;
        let mut sum = c[0] + zn * c[n - 1];
        let mut zk = POLE;
        for &v in &c[1..n - 1] {
            sum += (zk + z2n / zk) * v;
            zk *= POLE;
        }
        sum / (1.0 - z2n)
    };
    for k in 1..n {
        let prev = c[k - 1];
        c[k] += POLE * prev;
    }

    c[n - 1] = POLE / (POLE * POLE - 1.0) * (c[n - 1] + POLE * c[n - 2]);
    for k in (0..n - 1).rev() {
        let next = c[k + 1];
        c[k] = POLE * (next - c[k]);
    }
}

/// Four coefficient indices and their basis weights for one output sample
#[derive(Debug, Clone, Copy)]
struct Taps {
    index: [usize; 4],
    weight: [f64; 4],
}

impl Taps {
    /// Taps into an edge-padded coefficient line of `in_len + 2 * EDGE_PAD`
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn new(out: usize, in_len: usize, out_len: usize) -> Self {
        let scale = in_len as f64 / out_len as f64;
        let src = (out as f64 + 0.5) * scale - 0.5 + EDGE_PAD as f64;
        let base = src.floor() as i64;
        let last = (in_len + 2 * EDGE_PAD) as i64 - 1;
        let mut index = [0usize; 4];
        let mut weight = [0f64; 4];
        for (k, (i, w)) in index.iter_mut().zip(&mut weight).enumerate() {
            let node = base + k as i64 - 1;
            *i = node.clamp(0, last) as usize;
            *w = bspline(src - node as f64);
        }
        Self { index, weight }
    }

    fn apply(&self, coeffs: &[f64]) -> f64 {
        self.index.iter().zip(&self.weight).map(|(&i, &w)| coeffs[i] * w).sum()
    }
}

fn coefficients(line: ArrayView1<'_, f64>, buf: &mut Vec<f64>) {
    let n = line.len();
    buf.clear();
    buf.extend(iter::repeat(line[0]).take(EDGE_PAD));
    buf.extend(line.iter().copied());
    buf.extend(iter::repeat(line[n - 1]).take(EDGE_PAD));
    prefilter(buf);
}

fn resample_cols(input: ArrayView2<'_, f64>, out_cols: usize) -> Array2<f64> {
    let taps: Vec<Taps> = (0..out_cols)
        .map(|o| Taps::new(o, input.ncols(), out_cols))
        .collect();
    let mut out = Array2::zeros((input.nrows(), out_cols));
    let mut coeffs = Vec::with_capacity(input.ncols() + 2 * EDGE_PAD);
    for (line, mut dst) in input.rows().into_iter().zip(out.rows_mut()) {
        coefficients(line, &mut coeffs);
        for (value, tap) in dst.iter_mut().zip(&taps) {
            *value = tap.apply(&coeffs);
        }
    }
    out
}

/// Resize `image` to `rows x cols` with cubic B-spline interpolation
///
/// Resizing to the input's own shape reproduces the input up to rounding.
///
/// # Errors
/// - [`GeometryError::EmptyImage`] if the input has a zero-length axis
/// - [`GeometryError::InvalidTargetSize`] if `rows` or `cols` is zero
#[allow(clippy::cast_possible_truncation)]
pub fn resize(image: ArrayView2<'_, f32>, rows: usize, cols: usize) -> Result<Array2<f32>> {
    let (h, w) = image.dim();
    if h == 0 || w == 0 {
        return Err(GeometryError::EmptyImage { rows: h, cols: w });
    }
    if rows == 0 || cols == 0 {
        return Err(GeometryError::InvalidTargetSize { rows, cols });
    }

    let lo = image.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = image.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let wide = image.mapv(f64::from);
    let horizontal = resample_cols(wide.view(), cols);
    // cols x rows
    let vertical = resample_cols(horizontal.t(), rows);
    let mut out = Array2::from_shape_fn((rows, cols), |(r, c)| vertical[[c, r]] as f32);
    // lo > hi only when every input pixel is NaN
    if lo <= hi {
        out.mapv_inplace(|v| v.clamp(lo, hi));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(actual: &[f32], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
            assert!((f64::from(a) - e).abs() < 1e-6, "sample {i}: {a} != {e}");
        }
    }

    #[test]
    fn basis_partition_of_unity() {
        for step in 0..10 {
            let t = f64::from(step) / 10.0;
            let sum: f64 = (-1..3).map(|k| bspline(t - f64::from(k))).sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert!((bspline(0.0) - 2.0 / 3.0).abs() < 1e-15);
        assert!((bspline(1.0) - 1.0 / 6.0).abs() < 1e-15);
        assert_eq!(bspline(2.0), 0.0);
    }

    #[test]
    fn prefilter_interpolates_samples() {
        let samples = [0.1, 0.9, 0.3, 0.5, 0.7, 0.2, 0.0, 1.0];
        for len in [2, samples.len()] {
            let mut c = samples[..len].to_vec();
            prefilter(&mut c);
            for k in 0..len {
                let left = if k == 0 { c[1] } else { c[k - 1] };
                let right = if k + 1 == len { c[len - 2] } else { c[k + 1] };
                let value = (left + 4.0 * c[k] + right) / 6.0;
                assert!((value - samples[k]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn impulse_upsample_matches_reference() {
        let mut image = Array2::<f32>::zeros((1, 16));
        image[[0, 8]] = 1.0;
        let out = resize(image.view(), 1, 32).unwrap();
        let row: Vec<f32> = out.row(0).to_vec();
        // negative ringing at 13, 14, 19 and 20 is clipped to the input range
        assert_close(
            &row[12..22],
            &[
                0.032_994_590_011_919,
                0.0,
                0.0,
                0.269_291_065_556_880,
                0.881_430_355_185_627,
                0.881_430_355_185_627,
                0.269_291_065_556_880,
                0.0,
                0.0,
                0.032_994_590_011_919,
            ],
        );
    }

    #[test]
    fn step_upsample_matches_reference() {
        let image = array![[0.0f32, 0.0, 1.0, 1.0]];
        let out = resize(image.view(), 1, 13).unwrap();
        assert_close(
            out.as_slice().unwrap(),
            &[
                0.028_704_880_778_965,
                0.006_105_402_046_883,
                0.0,
                0.0,
                0.0,
                0.157_321_194_904_536,
                0.5,
                0.842_678_805_095_462,
                1.0,
                1.0,
                1.0,
                0.993_894_597_953_117,
                0.971_295_119_221_036,
            ],
        );
    }

    #[test]
    fn downsample_matches_reference() {
        let image = array![[0.1f32, 0.9, 0.3, 0.5, 0.7]];
        let out = resize(image.view(), 1, 3).unwrap();
        assert_close(
            out.as_slice().unwrap(),
            &[0.391_082_336_393_177, 0.3, 0.668_920_130_915_327],
        );
    }

    #[test]
    fn axes_are_resampled_independently() {
        let image = array![[0.2f32], [0.6]];
        let tall = resize(image.view(), 5, 1).unwrap();
        let wide = resize(image.t(), 1, 5).unwrap();
        let expected = [0.2, 0.229_458_468_371_008, 0.4, 0.570_541_531_628_992, 0.6];
        assert_close(&tall.iter().copied().collect::<Vec<_>>(), &expected);
        assert_close(wide.as_slice().unwrap(), &expected);
    }

    #[test]
    fn identity_resize() {
        let image = Array2::from_shape_fn((6, 5), |(r, c)| ((r * 7 + c * 3) % 11) as f32 / 10.0);
        let out = resize(image.view(), 6, 5).unwrap();
        for (a, b) in out.iter().zip(image.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} != {b}");
        }
    }

    #[test]
    fn constant_image_stays_constant() {
        let image = Array2::from_elem((3, 9), 0.25f32);
        let out = resize(image.view(), 17, 4).unwrap();
        assert_eq!(out.dim(), (17, 4));
        assert!(out.iter().all(|&v| v == 0.25));
    }

    #[test]
    fn output_clipped_to_input_range() {
        let image = array![[0.0f32, 0.0, 1.0, 1.0], [0.0, 0.0, 1.0, 1.0]];
        let out = resize(image.view(), 2, 13).unwrap();
        assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn upsample_single_pixel_uses_edge() {
        let image = array![[0.75f32]];
        let out = resize(image.view(), 3, 3).unwrap();
        assert!(out.iter().all(|&v| v == 0.75));
    }

    #[test]
    fn rejects_empty_input_and_target() {
        let empty = Array2::<f32>::zeros((0, 4));
        assert_eq!(
            resize(empty.view(), 2, 2),
            Err(GeometryError::EmptyImage { rows: 0, cols: 4 })
        );
        let image = Array2::<f32>::zeros((2, 2));
        assert_eq!(
            resize(image.view(), 0, 2),
            Err(GeometryError::InvalidTargetSize { rows: 0, cols: 2 })
        );
    }
}
