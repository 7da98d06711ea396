//! Sequential dataset encoding
//!
//! Each identifier goes through fetch, extract, normalize and write before
//! the next one starts. A failure in any step skips that identifier and is
//! counted; only sink failures and run setup problems end the pass.

use crate::config::EncoderConfig;
use crate::error::{ConfigError, EncodeError};
use crate::manifest::read_image_list;
use crate::normalizer::Normalizer;
use crate::report::{EncodeReport, EncodeSummary, FailedIdentifier, FailureStage, FAILURE_REPORT_SUFFIX};
use chrono::Utc;
use god_archive::{
    ArchiveCache, ArchiveExtractor, ArchiveFetcher, ArchiveTransport, HttpTransport, ImageIdentifier,
};
use god_records::{RecordError, RecordSink, TfRecordWriter, RECORD_EXTENSION};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info_span, Instrument, Span};

type StageFailure = (FailureStage, String);

/// Drives fetch, extract, normalize and write over an image list
pub struct DatasetEncoder<T> {
    config: EncoderConfig,
    cache: ArchiveCache,
    fetcher: ArchiveFetcher<T>,
    extractor: ArchiveExtractor,
    normalizer: Normalizer,
    span: Span,
}

impl DatasetEncoder<HttpTransport> {
    /// Create encoder talking to the configured archive service over HTTP
    ///
    /// # Errors
    /// - [`ConfigError::MissingCredentials`] if username or key is empty
    /// - [`EncodeError::Config`] if the configuration is invalid
    /// - [`EncodeError::Archive`] if the HTTP client cannot be built
    pub fn from_config(config: EncoderConfig) -> Result<Self, EncodeError> {
        if !config.credentials.is_complete() {
            return Err(ConfigError::MissingCredentials.into());
        }
        let transport = HttpTransport::new(config.request_timeout())?;
        Self::new(config, transport)
    }
}

impl<T: ArchiveTransport> DatasetEncoder<T> {
    /// Create encoder over any transport
    ///
    /// # Errors
    /// Returns [`EncodeError::Config`] if the configuration is invalid
    pub fn new(config: EncoderConfig, transport: T) -> Result<Self, EncodeError> {
        config.validate()?;
        let fetcher = ArchiveFetcher::new(transport, config.credentials.clone())
            .with_base_url(config.base_url.clone())
            .with_retry(config.retry);
        Ok(Self {
            cache: ArchiveCache::new(config.archive_dir()),
            fetcher,
            extractor: ArchiveExtractor::new(),
            normalizer: Normalizer::new(config.geometry),
            span: info_span!("encoder"),
            config,
        })
    }

    /// Configuration in use
    #[inline]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Archive cache in use
    #[inline]
    pub fn cache(&self) -> &ArchiveCache {
        &self.cache
    }

    /// Record file for `list_path`: `<output_dir>/<list stem>.tfrecords`
    ///
    /// # Errors
    /// Returns [`EncodeError::InvalidListName`] if the path has no file stem
    pub fn output_path(&self, list_path: &Path) -> Result<PathBuf, EncodeError> {
        let stem = list_stem(list_path)?;
        Ok(self.config.output_dir.join(format!("{stem}.{RECORD_EXTENSION}")))
    }

    /// Failure report for `list_path`: `<output_dir>/<list stem>.failures.json`
    ///
    /// # Errors
    /// Returns [`EncodeError::InvalidListName`] if the path has no file stem
    pub fn report_path(&self, list_path: &Path) -> Result<PathBuf, EncodeError> {
        let stem = list_stem(list_path)?;
        Ok(self.config.output_dir.join(format!("{stem}.{FAILURE_REPORT_SUFFIX}")))
    }

    /// Encode an image list file into a new record file
    ///
    /// Writes the record file and the failure report into `output_dir`.
    ///
    /// # Errors
    /// - [`EncodeError::OutputExists`] if the record file is already present
    /// - [`EncodeError::Manifest`] if the list cannot be parsed
    /// - [`EncodeError::Sink`] or [`EncodeError::Report`] on write failures
    pub async fn encode_list(&self, list_path: &Path) -> Result<EncodeReport, EncodeError> {
        let started_at = Utc::now();
        let output = self.output_path(list_path)?;
        let report_path = self.report_path(list_path)?;
        if output.exists() {
            return Err(EncodeError::OutputExists(output));
        }
        let identifiers = read_image_list(list_path)?;

        std::fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| EncodeError::io_error(&self.config.output_dir, e))?;
        let mut writer = TfRecordWriter::create(&output).map_err(|e| match e {
            RecordError::AlreadyExists(path) => EncodeError::OutputExists(path),
            other => EncodeError::Sink(other),
        })?;
        tracing::info!("initialised record file at {}", output.display());

        let summary = self.encode(&identifiers, &mut writer).await?;
        let report = EncodeReport::new(list_path.to_path_buf(), output, started_at, Utc::now(), summary);
        report.write_json(&report_path)?;
        Ok(report)
    }

    /// Encode `identifiers` into `sink`, in order, then finish the sink
    ///
    /// # Errors
    /// Returns [`EncodeError::Sink`] if appending or finishing fails.
    /// Per-identifier failures are reported in the summary instead.
    pub async fn encode<S>(&self, identifiers: &[ImageIdentifier], sink: &mut S) -> Result<EncodeSummary, EncodeError>
    where
        S: RecordSink + ?Sized,
    {
        self.encode_inner(identifiers, sink).instrument(self.span.clone()).await
    }

    async fn encode_inner<S>(&self, identifiers: &[ImageIdentifier], sink: &mut S) -> Result<EncodeSummary, EncodeError>
    where
        S: RecordSink + ?Sized,
    {
        let mut summary = EncodeSummary::default();
        // synsets whose archive could not be fetched in this pass
        let mut unavailable: HashMap<String, String> = HashMap::new();

        for id in identifiers {
            let outcome = match unavailable.get(id.synset()) {
                Some(reason) => Err((FailureStage::Fetching, reason.clone())),
                None => self.process(id).await,
            };
            match outcome {
                Ok(payload) => {
                    sink.append(id.as_str(), &payload).map_err(EncodeError::Sink)?;
                    tracing::info!("saved {} successfully as record {}", id, summary.records);
                    summary.records += 1;
                }
                Err((stage, reason)) => {
                    tracing::warn!(identifier = %id, %stage, "failed to locate {id}: {reason}");
                    if stage == FailureStage::Fetching {
                        unavailable.insert(id.synset().to_string(), reason.clone());
                    }
                    summary.failures.push(FailedIdentifier {
                        identifier: id.to_string(),
                        stage,
                        reason,
                    });
                }
            }
        }

        sink.finish().map_err(EncodeError::Sink)?;
        tracing::info!("saved {} images successfully", summary.record_count());
        tracing::info!("{} images failed to convert", summary.failure_count());
        Ok(summary)
    }

    async fn process(&self, id: &ImageIdentifier) -> Result<Vec<u8>, StageFailure> {
        let archive = self.cache.archive_path(id.synset());
        self.fetcher
            .ensure_archive(id.synset(), &archive)
            .await
            .map_err(|e| (FailureStage::Fetching, e.to_string()))?;

        let extractor = self.extractor.clone();
        let member = id.member_name().to_string();
        let raw = tokio::task::spawn_blocking(move || extractor.extract_image(&archive, &member))
            .await
            .map_err(|e| (FailureStage::Extracting, e.to_string()))?
            .map_err(|e| (FailureStage::Extracting, e.to_string()))?;

        let normalizer = self.normalizer;
        tokio::task::spawn_blocking(move || {
            let tensor = normalizer
                .normalize(&raw)
                .map_err(|e| (FailureStage::Normalizing, e.to_string()))?;
            tensor.to_png16().map_err(|e| (FailureStage::Writing, e.to_string()))
        })
        .await
        .map_err(|e| (FailureStage::Normalizing, e.to_string()))?
    }
}

fn list_stem(list_path: &Path) -> Result<&str, EncodeError> {
    list_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EncodeError::InvalidListName(list_path.to_path_buf()))
}
