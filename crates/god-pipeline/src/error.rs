//! Error types for normalization and encoding
//!
//! [`NormalizeError`] is per-image and gets counted by the encoder.
//! [`EncodeError`] ends the run.

use god_archive::ArchiveError;
use god_geometry::GeometryError;
use god_records::RecordError;
use std::path::PathBuf;

/// Why an image could not be normalized
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    /// Crop, resize or placement failed
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Result contains NaN or infinite pixels
    #[error("normalized image has {count} non-finite pixels")]
    NonFinite { count: usize },
}

/// Problems with the image list
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// List cannot be read
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Row does not have the expected column count
    #[error("line {line}: expected {expected} columns, found {found}")]
    Malformed {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Last column is not a usable identifier
    #[error("line {line}: {source}")]
    Identifier {
        line: usize,
        #[source]
        source: ArchiveError,
    },
}

/// Invalid or unreadable configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file cannot be read
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::EncoderConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Field value out of range
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// Username or access key is empty
    #[error("archive service credentials are missing")]
    MissingCredentials,
}

impl ConfigError {
    /// Create out-of-range error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Run-level failures of the dataset encoder
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Image list rejected
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Output record file already present
    #[error("{0} already exists")]
    OutputExists(PathBuf),

    /// List path has no usable file stem
    #[error("cannot derive an output name from {0}")]
    InvalidListName(PathBuf),

    /// Record sink failed; the output may be incomplete
    #[error("record sink failed: {0}")]
    Sink(#[source] RecordError),

    /// Archive client could not be built
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Failure report could not be written
    #[error("failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error at a known path
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EncodeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
