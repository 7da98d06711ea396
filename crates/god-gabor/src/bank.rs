//! Filter banks
//!
//! A bank spans `n_orient` orientations evenly covering `[0, pi)` and
//! `n_phase` phases evenly covering `[0, pi / 2]`. Kernels at oblique
//! orientations have different supports, so they are either padded to the
//! largest shape or cropped to the smallest side before stacking.

use crate::error::{GaborError, Result};
use crate::kernel::{gabor_kernel, GaborParams};
use god_geometry::index_middle;
use ndarray::{s, Array2, Array4};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// How kernels of different shapes are brought to a common shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackMode {
    /// Zero-pad every kernel to the largest height and width
    #[default]
    Pad,
    /// Crop every kernel to a square of the smallest side found in the bank
    Crop,
}

/// Bank layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Envelope standard deviation in pixels
    pub sigma: f64,
    /// Support half-width in standard deviations
    pub n_sigma: f64,
    /// Carrier cycles per standard deviation
    pub cycles_per_sigma: f64,
    /// Number of orientations
    pub n_orient: usize,
    /// Number of phases
    pub n_phase: usize,
    /// Stacking mode
    pub mode: StackMode,
}

impl BankConfig {
    /// 8 orientations, quadrature pair, half a cycle per sigma, padded
    #[inline]
    #[must_use]
    pub fn new(sigma: f64, n_sigma: f64) -> Self {
        Self {
            sigma,
            n_sigma,
            cycles_per_sigma: 0.5,
            n_orient: 8,
            n_phase: 2,
            mode: StackMode::Pad,
        }
    }

    /// With orientation and phase counts
    #[inline]
    #[must_use]
    pub fn with_counts(mut self, n_orient: usize, n_phase: usize) -> Self {
        self.n_orient = n_orient;
        self.n_phase = n_phase;
        self
    }

    /// With stacking mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: StackMode) -> Self {
        self.mode = mode;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn orientations(&self) -> impl Iterator<Item = f64> {
        let n = self.n_orient;
        (0..n).map(move |i| PI * i as f64 / n as f64)
    }

    #[allow(clippy::cast_precision_loss)]
    fn phases(&self) -> Vec<f64> {
        match self.n_phase {
            0 => Vec::new(),
            1 => vec![0.0],
            n => (0..n).map(|i| FRAC_PI_2 * i as f64 / (n - 1) as f64).collect(),
        }
    }
}

/// Build the bank as a `height x width x 1 x n_filters` tensor
///
/// Filters are ordered orientation-major: all phases of the first
/// orientation, then all phases of the next.
///
/// # Errors
/// - [`GaborError::EmptyBank`] if either count is zero
/// - [`GaborError::InvalidParameter`] for non-positive scales
pub fn filter_bank(config: &BankConfig) -> Result<Array4<f32>> {
    if config.n_orient == 0 || config.n_phase == 0 {
        return Err(GaborError::EmptyBank {
            orientations: config.n_orient,
            phases: config.n_phase,
        });
    }
    GaborError::check_positive("sigma", config.sigma)?;
    let frequency = config.cycles_per_sigma / config.sigma;
    let phases = config.phases();

    let mut kernels = Vec::with_capacity(config.n_orient * phases.len());
    for theta in config.orientations() {
        for &offset in &phases {
            let params = GaborParams::new(frequency, config.sigma)
                .with_theta(theta)
                .with_offset(offset)
                .with_n_stds(config.n_sigma);
            kernels.push(gabor_kernel(&params)?);
        }
    }

    match config.mode {
        StackMode::Pad => hard_stack(&kernels, 0.0),
        StackMode::Crop => crop_stack(&kernels),
    }
}

/// Pad kernels to a common shape and stack them along a trailing filter axis
///
/// Each kernel is padded with `fill`, `floor(diff / 2)` before and
/// `ceil(diff / 2)` after along each axis.
///
/// # Errors
/// Returns [`GaborError::EmptyBank`] when `kernels` is empty
pub fn hard_stack(kernels: &[Array2<f32>], fill: f32) -> Result<Array4<f32>> {
    if kernels.is_empty() {
        return Err(GaborError::EmptyBank {
            orientations: 0,
            phases: 0,
        });
    }
    let rows = kernels.iter().map(Array2::nrows).max().unwrap_or(0);
    let cols = kernels.iter().map(Array2::ncols).max().unwrap_or(0);

    let mut out = Array4::from_elem((rows, cols, 1, kernels.len()), fill);
    for (k, kernel) in kernels.iter().enumerate() {
        let r = (rows - kernel.nrows()) / 2;
        let c = (cols - kernel.ncols()) / 2;
        out.slice_mut(s![r..r + kernel.nrows(), c..c + kernel.ncols(), 0, k])
            .assign(kernel);
    }
    Ok(out)
}

fn crop_stack(kernels: &[Array2<f32>]) -> Result<Array4<f32>> {
    let side = kernels
        .iter()
        .flat_map(|k| [k.nrows(), k.ncols()])
        .min()
        .ok_or(GaborError::EmptyBank {
            orientations: 0,
            phases: 0,
        })?;

    let mut out = Array4::zeros((side, side, 1, kernels.len()));
    for (k, kernel) in kernels.iter().enumerate() {
        let r = index_middle(kernel.nrows(), side)?;
        let c = index_middle(kernel.ncols(), side)?;
        out.slice_mut(s![.., .., 0, k]).assign(&kernel.slice(s![r, c]));
    }
    Ok(out)
}
