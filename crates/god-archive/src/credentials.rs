//! Archive service credentials and request URLs

use crate::error::{ArchiveError, ArchiveResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Formatter};

/// Default archive service
pub const DEFAULT_BASE_URL: &str = "http://www.image-net.org";

/// Username and access key for the archive service
///
/// `Debug` never prints the access key.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name
    #[serde(default)]
    pub username: String,
    /// Access key issued with the account
    #[serde(default)]
    pub access_key: String,
}

impl Credentials {
    /// Create credentials
    #[inline]
    #[must_use]
    pub fn new(username: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            access_key: access_key.into(),
        }
    }

    /// Check if both fields are filled
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.access_key.is_empty()
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Download URL for a synset archive
///
/// Query values are percent-encoded, so keys may contain any character.
///
/// # Errors
/// Returns [`ArchiveError::InvalidUrl`] if `base_url` is not an absolute URL
pub fn synset_url(base_url: &str, synset: &str, credentials: &Credentials) -> ArchiveResult<String> {
    let endpoint = format!("{}/download/synset", base_url.trim_end_matches('/'));
    let url = Url::parse_with_params(
        &endpoint,
        [
            ("wnid", synset),
            ("username", credentials.username.as_str()),
            ("accesskey", credentials.access_key.as_str()),
            ("release", "latest"),
            ("src", "stanford"),
        ],
    )
    .map_err(|e| ArchiveError::InvalidUrl(format!("{base_url}: {e}")))?;
    Ok(url.into())
}

/// [`synset_url`] with the access key masked, for logs
///
/// # Errors
/// Same as [`synset_url`]
pub fn redacted_url(base_url: &str, synset: &str, credentials: &Credentials) -> ArchiveResult<String> {
    let masked = Credentials::new(credentials.username.clone(), "***");
    synset_url(base_url, synset, &masked)
}
