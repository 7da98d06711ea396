//! Bounded-retry archive acquisition
//!
//! [`ArchiveFetcher::ensure_archive`] is idempotent: an archive already on
//! disk is never re-downloaded, and a new one only becomes visible at its
//! final path once fully written.

use crate::cache::{ArchiveDigest, PartialArchive};
use crate::credentials::{redacted_url, synset_url, Credentials, DEFAULT_BASE_URL};
use crate::error::{ArchiveError, ArchiveResult};
use crate::retry::RetryPolicy;
use crate::transport::ArchiveTransport;
use std::path::Path;
use tracing::{debug, info, info_span, warn, Instrument, Span};

/// Result of [`ArchiveFetcher::ensure_archive`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Archive was already present; no network access happened
    Cached,
    /// Archive was downloaded and stored
    Downloaded {
        /// Archive size
        bytes: u64,
        /// Attempts used, including the successful one
        attempts: u32,
        /// Content digest
        digest: ArchiveDigest,
    },
}

impl FetchOutcome {
    /// Check if the network was used
    #[inline]
    #[must_use]
    pub fn was_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

/// Downloads synset archives with a bounded attempt budget
pub struct ArchiveFetcher<T> {
    transport: T,
    base_url: String,
    credentials: Credentials,
    retry: RetryPolicy,
    span: Span,
}

impl<T: ArchiveTransport> ArchiveFetcher<T> {
    /// Create fetcher with default base URL and retry policy
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            retry: RetryPolicy::default(),
            span: info_span!("fetcher"),
        }
    }

    /// With archive service base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Active retry policy
    #[inline]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Underlying transport
    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Make sure the archive for `synset` exists at `destination`
    ///
    /// # Errors
    /// - [`ArchiveError::RetryExhausted`] if every attempt failed; nothing is
    ///   written in that case
    /// - [`ArchiveError::Io`] if the archive cannot be stored
    pub async fn ensure_archive(&self, synset: &str, destination: &Path) -> ArchiveResult<FetchOutcome> {
        let span = info_span!(parent: &self.span, "ensure_archive", synset);
        self.ensure_inner(synset, destination).instrument(span).await
    }

    async fn ensure_inner(&self, synset: &str, destination: &Path) -> ArchiveResult<FetchOutcome> {
        let exists = tokio::fs::try_exists(destination)
            .await
            .map_err(|e| ArchiveError::io_error(destination, e))?;
        if exists {
            debug!(archive = %destination.display(), "archive already present");
            return Ok(FetchOutcome::Cached);
        }

        info!(archive = %destination.display(), "archive does not exist, downloading");
        let (partial, attempts) = self.download(synset, destination).await?;

        let (bytes, digest) = tokio::task::spawn_blocking(move || partial.commit())
            .await
            .map_err(|e| ArchiveError::io_error(destination, std::io::Error::other(e)))??;

        info!(bytes, attempts, digest = %digest.short(), "archive stored");
        Ok(FetchOutcome::Downloaded {
            bytes,
            attempts,
            digest,
        })
    }

    async fn download(&self, synset: &str, destination: &Path) -> ArchiveResult<(PartialArchive, u32)> {
        let url = synset_url(&self.base_url, synset, &self.credentials)?;
        let shown = redacted_url(&self.base_url, synset, &self.credentials)?;
        debug!(url = %shown, "requesting archive");

        let max_attempts = self.retry.max_attempts;
        for attempt in 1..=max_attempts {
            // a failed attempt drops its partial file
            let mut partial = PartialArchive::create(destination)?;
            match self.transport.fetch(&url, &mut partial).await {
                Ok(_) => {
                    debug!(attempt, "successful download on attempt {attempt}");
                    return Ok((partial, attempt));
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "archive request failed");
                    if attempt < max_attempts {
                        let delay = self.retry.backoff.delay(attempt);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }

        Err(ArchiveError::RetryExhausted {
            synset: synset.to_string(),
            attempts: max_attempts,
        })
    }
}
