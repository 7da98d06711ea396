//! Error types for archive acquisition and extraction
//!
//! Every variant is scoped to a single identifier: callers count it as a
//! skipped image and move on.

use std::path::PathBuf;

/// Transport-level failure of one download attempt
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Server answered with a non-success status
    #[error("server returned status {0}")]
    Status(u16),

    /// Connection, TLS or body transfer failure
    #[error("transfer failed: {0}")]
    Connection(String),

    /// Body could not be written to the partial archive
    #[error("failed to store response body: {0}")]
    Write(String),
}

/// Errors from fetching archives and reading images out of them
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Identifier has no usable synset prefix
    #[error("invalid image identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Remote service failed on every attempt
    #[error("failed to retrieve synset {synset} in {attempts} attempts")]
    RetryExhausted { synset: String, attempts: u32 },

    /// Archive has no member with the requested name
    #[error("{member} not found in {archive}")]
    MemberNotFound { archive: PathBuf, member: String },

    /// Member bytes are not a decodable image
    #[error("failed to decode {member}: {source}")]
    Decode {
        member: String,
        #[source]
        source: image::ImageError,
    },

    /// Archive exists but cannot be read as a tar container
    #[error("corrupt archive {archive}: {source}")]
    Corrupt {
        archive: PathBuf,
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

    /// HTTP client could not be constructed
    #[error("http client error: {0}")]
    Client(String),

    /// Base URL cannot be turned into a request URL
    #[error("invalid archive service URL: {0}")]
    InvalidUrl(String),
}

impl ArchiveError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create corrupt-archive error for path
    pub fn corrupt(archive: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Corrupt {
            archive: archive.into(),
            source,
        }
    }

    /// Check if the error came from the network rather than archive content
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. } | Self::Client(_))
    }
}

/// Result type alias for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
