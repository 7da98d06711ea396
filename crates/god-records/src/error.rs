//! Error types for record files

use std::path::PathBuf;

/// Errors from writing or reading record files
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Output file is already present
    #[error("record file already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Filesystem error at a known path
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stream error without a path (in-memory or already opened writers)
    #[error("record stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// Record header or body ends early
    #[error("truncated record at byte {offset}")]
    Truncated { offset: u64 },

    /// Stored checksum does not match the content
    #[error("{part} checksum mismatch at byte {offset}")]
    Checksum { offset: u64, part: &'static str },

    /// Example payload is not valid wire data
    #[error("malformed example: {0}")]
    Malformed(String),

    /// Example lacks a required feature
    #[error("missing feature '{0}'")]
    MissingFeature(&'static str),

    /// PNG encoding or decoding failed
    #[error("png codec error: {0}")]
    Png(#[from] image::ImageError),

    /// Image dimensions do not fit the codec
    #[error("image of {rows}x{cols} cannot be encoded")]
    Dimensions { rows: usize, cols: usize },

    /// Sink was used after `finish`
    #[error("record sink already finished")]
    Finished,
}

impl RecordError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create malformed-example error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

/// Result type alias for record operations
pub type RecordResult<T> = Result<T, RecordError>;
