//! Error types for geometry helpers

/// Errors raised when an image does not fit the requested geometry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// Requested window is longer than the axis it is cut from
    #[error("window of length {n} does not fit in axis of length {len}")]
    WindowTooLarge { len: usize, n: usize },

    /// Input image has a zero-length axis
    #[error("image is empty: {rows}x{cols}")]
    EmptyImage { rows: usize, cols: usize },

    /// Requested output size has a zero-length axis
    #[error("invalid target size: {rows}x{cols}")]
    InvalidTargetSize { rows: usize, cols: usize },

    /// Expansion target is smaller than the image being expanded
    #[error("target {target_rows}x{target_cols} is smaller than image {rows}x{cols}")]
    TargetTooSmall {
        rows: usize,
        cols: usize,
        target_rows: usize,
        target_cols: usize,
    },
}

/// Result type alias for geometry operations
pub type Result<T> = std::result::Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_error_display() {
        let err = GeometryError::WindowTooLarge { len: 3, n: 5 };
        assert_eq!(
            err.to_string(),
            "window of length 5 does not fit in axis of length 3"
        );
    }
}
