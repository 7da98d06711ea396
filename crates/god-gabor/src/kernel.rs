//! Single Gabor kernels

use crate::error::{GaborError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Parameters of one Gabor kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaborParams {
    /// Spatial frequency of the carrier, cycles per pixel
    pub frequency: f64,
    /// Orientation in radians
    pub theta: f64,
    /// Gaussian envelope standard deviation along the carrier
    pub sigma_x: f64,
    /// Gaussian envelope standard deviation across the carrier
    pub sigma_y: f64,
    /// Half-width of the support in standard deviations
    pub n_stds: f64,
    /// Carrier phase offset in radians
    pub offset: f64,
}

impl GaborParams {
    /// Isotropic kernel with zero phase and a 3 standard deviation support
    #[inline]
    #[must_use]
    pub fn new(frequency: f64, sigma: f64) -> Self {
        Self {
            frequency,
            theta: 0.0,
            sigma_x: sigma,
            sigma_y: sigma,
            n_stds: 3.0,
            offset: 0.0,
        }
    }

    /// With orientation
    #[inline]
    #[must_use]
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// With phase offset
    #[inline]
    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// With support half-width in standard deviations
    #[inline]
    #[must_use]
    pub fn with_n_stds(mut self, n_stds: f64) -> Self {
        self.n_stds = n_stds;
        self
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn half_extent(a: f64, b: f64) -> usize {
    a.abs().max(b.abs()).max(1.0).ceil() as usize
}

/// Real part of a Gabor kernel
///
/// The kernel has shape `(2 * y0 + 1, 2 * x0 + 1)` where the half extents
/// cover `n_stds` standard deviations of the rotated envelope (at least one
/// pixel each way). The envelope is normalised by `2 * pi * sigma_x * sigma_y`.
///
/// # Errors
/// Returns [`GaborError::InvalidParameter`] if a sigma, the frequency or
/// `n_stds` is not strictly positive.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn gabor_kernel(params: &GaborParams) -> Result<Array2<f32>> {
    GaborError::check_positive("frequency", params.frequency)?;
    GaborError::check_positive("sigma_x", params.sigma_x)?;
    GaborError::check_positive("sigma_y", params.sigma_y)?;
    GaborError::check_positive("n_stds", params.n_stds)?;

    let (st, ct) = params.theta.sin_cos();
    let (sx, sy) = (params.sigma_x, params.sigma_y);
    let x0 = half_extent(params.n_stds * sx * ct, params.n_stds * sy * st);
    let y0 = half_extent(params.n_stds * sy * ct, params.n_stds * sx * st);
    let norm = 2.0 * PI * sx * sy;

    let kernel = Array2::from_shape_fn((2 * y0 + 1, 2 * x0 + 1), |(r, c)| {
        let y = r as f64 - y0 as f64;
        let x = c as f64 - x0 as f64;
        let rotx = x * ct + y * st;
        let roty = -x * st + y * ct;
        let envelope = (-0.5 * (rotx * rotx / (sx * sx) + roty * roty / (sy * sy))).exp() / norm;
        let carrier = (2.0 * PI * params.frequency * rotx + params.offset).cos();
        (envelope * carrier) as f32
    });
    Ok(kernel)
}

/// Expected side length of an isotropic kernel at orientation `theta`
///
/// Use it to pick parameters that give at least a required support before
/// trimming a bank with [`StackMode::Crop`](crate::StackMode::Crop).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn filter_size(theta: f64, sigma: f64, n_stds: f64) -> usize {
    let (st, ct) = theta.sin_cos();
    let reach = (n_stds * sigma * st).abs().max((n_stds * sigma * ct).abs());
    1 + 2 * reach.ceil() as usize
}
