//! GOD Archive
//!
//! Acquisition of per-synset image archives and extraction of single images
//! from them.
//!
//! # Core Concepts
//!
//! - [`ImageIdentifier`]: `<synset>_<suffix>` name selecting archive and member
//! - [`ArchiveFetcher`]: idempotent download with a bounded attempt budget
//! - [`ArchiveExtractor`]: reads one tar member and decodes it to grayscale
//! - [`ArchiveTransport`]: network seam, implemented by [`HttpTransport`];
//!   bodies stream into a [`PartialArchive`] that is renamed into place
//!
//! # Example
//!
//! ```rust,ignore
//! use god_archive::prelude::*;
//!
//! let id = ImageIdentifier::parse("n01443537_22563.JPEG")?;
//! let cache = ArchiveCache::new("/data/archives");
//! let path = cache.archive_path(id.synset());
//!
//! let fetcher = ArchiveFetcher::new(HttpTransport::new(timeout)?, credentials);
//! fetcher.ensure_archive(id.synset(), &path).await?;
//! let image = ArchiveExtractor::new().extract_image(&path, id.member_name())?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod identifier;
pub mod raw_image;
pub mod retry;
pub mod transport;

pub use cache::{ArchiveCache, ArchiveDigest, PartialArchive, ARCHIVE_EXTENSION};
pub use credentials::{redacted_url, synset_url, Credentials, DEFAULT_BASE_URL};
pub use error::{ArchiveError, ArchiveResult, TransportError};
pub use extractor::ArchiveExtractor;
pub use fetcher::{ArchiveFetcher, FetchOutcome};
pub use identifier::{ImageIdentifier, SYNSET_SEPARATOR};
pub use raw_image::{RawImage, LUMA_WEIGHTS};
pub use retry::{Backoff, RetryPolicy, MAX_ATTEMPTS};
pub use transport::{ArchiveTransport, HttpTransport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        ArchiveCache, ArchiveError, ArchiveExtractor, ArchiveFetcher, ArchiveResult,
        ArchiveTransport, Credentials, FetchOutcome, HttpTransport, ImageIdentifier, RawImage,
        RetryPolicy,
    };
}
