//! Encoder configuration
//!
//! ```toml
//! output_dir = "/data/god"
//! archive_dir = "/data/god/archives"
//! request_timeout_secs = 60
//!
//! [credentials]
//! username = "alice"
//! access_key = "..."
//!
//! [geometry]
//! inner_px = 500
//! canvas_px = 550
//! degrees = 12.0
//!
//! [retry]
//! max_attempts = 5
//! backoff = { kind = "exponential", base_ms = 500, max_ms = 8000 }
//! ```

use crate::error::ConfigError;
use crate::normalizer::StimulusGeometry;
use crate::telemetry::LoggingConfig;
use god_archive::{Credentials, RetryPolicy, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted for an empty username
pub const USERNAME_ENV: &str = "IMAGENET_USERNAME";
/// Environment variable consulted for an empty access key
pub const ACCESS_KEY_ENV: &str = "IMAGENET_ACCESSKEY";

/// Everything the dataset encoder needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Where record files and failure reports are written
    pub output_dir: PathBuf,
    /// Archive cache; defaults to `output_dir`
    pub archive_dir: Option<PathBuf>,
    /// Archive service account
    pub credentials: Credentials,
    /// Stimulus geometry
    pub geometry: StimulusGeometry,
    /// Download retry policy
    pub retry: RetryPolicy,
    /// Archive service base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Log output
    pub logging: LoggingConfig,
}

impl EncoderConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on invalid TOML or unknown value types
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file, fill credentials from the environment, validate
    ///
    /// # Errors
    /// - [`ConfigError::Io`] if the file cannot be read
    /// - [`ConfigError::Parse`] or [`ConfigError::Invalid`] otherwise
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?.with_env_credentials();
        config.validate()?;
        Ok(config)
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// With archive cache directory
    #[inline]
    #[must_use]
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// With service credentials
    #[inline]
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// With stimulus geometry
    #[inline]
    #[must_use]
    pub fn with_geometry(mut self, geometry: StimulusGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// With archive service base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fill empty credential fields from [`USERNAME_ENV`] / [`ACCESS_KEY_ENV`]
    #[must_use]
    pub fn with_env_credentials(self) -> Self {
        self.with_credentials_from(|key| std::env::var(key).ok())
    }

    /// Fill empty credential fields from `lookup`
    #[must_use]
    pub fn with_credentials_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.credentials.username.is_empty() {
            if let Some(username) = lookup(USERNAME_ENV) {
                self.credentials.username = username;
            }
        }
        if self.credentials.access_key.is_empty() {
            if let Some(key) = lookup(ACCESS_KEY_ENV) {
                self.credentials.access_key = key;
            }
        }
        self
    }

    /// Archive cache directory in effect
    #[inline]
    #[must_use]
    pub fn archive_dir(&self) -> &Path {
        self.archive_dir.as_deref().unwrap_or(&self.output_dir)
    }

    /// Per-request timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check values are usable
    ///
    /// Credentials are not checked here; only the HTTP transport needs them.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts", "must be at least 1"));
        }
        self.geometry.validate()?;
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("base_url", "must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs", "must be positive"));
        }
        Ok(())
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            archive_dir: None,
            credentials: Credentials::default(),
            geometry: StimulusGeometry::default(),
            retry: RetryPolicy::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 60,
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use god_archive::Backoff;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_stimulus_geometry() {
        let config = EncoderConfig::default();
        assert_eq!(config.geometry.inner_px, 500);
        assert_eq!(config.geometry.canvas_px, 550);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff, Backoff::None);
        assert_eq!(config.archive_dir(), Path::new("."));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_toml() {
        let config = EncoderConfig::from_toml_str(
            r#"
            output_dir = "/out"
            request_timeout_secs = 30

            [credentials]
            username = "alice"
            access_key = "k"

            [geometry]
            inner_px = 200
            canvas_px = 220

            [retry]
            max_attempts = 3
            backoff = { kind = "fixed", delay_ms = 250 }
            "#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/out"));
        assert_eq!(config.archive_dir(), Path::new("/out"));
        assert_eq!(config.credentials, Credentials::new("alice", "k"));
        assert_eq!(config.geometry, StimulusGeometry::new(200, 220));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff, Backoff::Fixed { delay_ms: 250 });
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_bad_values() {
        let zero_attempts = EncoderConfig::new().with_retry(RetryPolicy::new().with_max_attempts(0));
        assert!(matches!(
            zero_attempts.validate(),
            Err(ConfigError::Invalid { field: "retry.max_attempts", .. })
        ));
        let oversized = EncoderConfig::new().with_geometry(StimulusGeometry::new(600, 550));
        assert!(matches!(
            oversized.validate(),
            Err(ConfigError::Invalid { field: "geometry.inner_px", .. })
        ));
        assert!(EncoderConfig::from_toml_str("geometry = 3").is_err());
    }

    #[test]
    fn environment_fills_only_missing_credentials() {
        let lookup = |key: &str| match key {
            USERNAME_ENV => Some("env-user".to_string()),
            ACCESS_KEY_ENV => Some("env-key".to_string()),
            _ => None,
        };
        let config = EncoderConfig::new()
            .with_credentials(Credentials::new("file-user", ""))
            .with_credentials_from(lookup);
        assert_eq!(config.credentials, Credentials::new("file-user", "env-key"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.toml");
        std::fs::write(&path, "output_dir = \"/data\"\n[geometry]\ninner_px = 0\n").unwrap();
        assert!(matches!(
            EncoderConfig::load(&path),
            Err(ConfigError::Invalid { field: "geometry.inner_px", .. })
        ));
    }
}
