//! Validation errors for RDM files
//!
//! All of these are fatal for the load; nothing is repaired.

use std::path::PathBuf;

/// Reasons an RDM file is rejected
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// File is not present
    #[error("rdm file not found: {0}")]
    MissingFile(PathBuf),

    /// File exists but cannot be read
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No header or no data rows
    #[error("rdm has no data")]
    Empty,

    /// Row count differs from column count
    #[error("rdm is not square: {rows} rows, {cols} columns")]
    NotSquare { rows: usize, cols: usize },

    /// Row label differs from the column label at the same position
    #[error("row label '{row}' does not match column label '{column}' at position {index}")]
    LabelMismatch {
        index: usize,
        row: String,
        column: String,
    },

    /// Label occurs twice in the header
    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),

    /// Row has the wrong number of cells
    #[error("line {line}: expected {expected} values, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Cell is not a number
    #[error("line {line}: '{value}' is not a number")]
    Parse { line: usize, value: String },

    /// Matrix differs from its transpose
    #[error("rdm is not symmetric at ({row}, {col}): {upper} vs {lower}")]
    Asymmetric {
        row: String,
        col: String,
        upper: f64,
        lower: f64,
    },
}

impl ValidationError {
    /// Create IO error for path, mapping not-found to [`Self::MissingFile`]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::MissingFile(path)
        } else {
            Self::Io { path, source }
        }
    }
}

/// Result type alias for RDM loading
pub type Result<T> = std::result::Result<T, ValidationError>;
