//! Error types for filter construction

use god_geometry::GeometryError;

/// Errors raised while building Gabor kernels or banks
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GaborError {
    /// A scale parameter was zero, negative or not finite
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Bank would contain no filters
    #[error("filter bank is empty: {orientations} orientations x {phases} phases")]
    EmptyBank { orientations: usize, phases: usize },

    /// Kernel placement failed
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

impl GaborError {
    pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidParameter { name, value })
        }
    }
}

/// Result type alias for filter construction
pub type Result<T> = std::result::Result<T, GaborError>;
