//! Network seam for archive downloads

use crate::cache::PartialArchive;
use crate::error::{ArchiveError, TransportError};
use async_trait::async_trait;
use std::time::Duration;

/// Streams the body of a URL into a partial archive
///
/// One call is one attempt; retrying is the fetcher's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveTransport: Send + Sync {
    /// Download `url` into `sink` and return the number of bytes written
    async fn fetch(&self, url: &str, sink: &mut PartialArchive) -> Result<u64, TransportError>;
}

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create transport with a per-request timeout
    ///
    /// # Errors
    /// Returns [`ArchiveError::Client`] if the TLS backend cannot be initialised
    pub fn new(timeout: Duration) -> Result<Self, ArchiveError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ArchiveError::Client(e.without_url().to_string()))?;
        Ok(Self { client })
    }
}

// The URL carries the access key, so it is stripped from every error message.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(err.without_url().to_string())
    }
}

#[async_trait]
impl ArchiveTransport for HttpTransport {
    async fn fetch(&self, url: &str, sink: &mut PartialArchive) -> Result<u64, TransportError> {
        let mut response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            sink.write_chunk(&chunk)
                .map_err(|e| TransportError::Write(e.to_string()))?;
        }
        Ok(sink.len())
    }
}
