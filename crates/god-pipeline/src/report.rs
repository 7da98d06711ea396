//! Run summaries and the persisted failure report

use crate::error::EncodeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Suffix of the failure report written next to the record file
pub const FAILURE_REPORT_SUFFIX: &str = "failures.json";

/// Pipeline step in which an identifier was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Fetching,
    Extracting,
    Normalizing,
    Writing,
}

impl Display for FailureStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Normalizing => "normalizing",
            Self::Writing => "writing",
        })
    }
}

/// One skipped identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedIdentifier {
    pub identifier: String,
    pub stage: FailureStage,
    pub reason: String,
}

/// Counts of one encode pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeSummary {
    /// Records appended, in input order
    pub records: usize,
    /// Skipped identifiers, in input order
    pub failures: Vec<FailedIdentifier>,
}

impl EncodeSummary {
    /// Number of records written
    #[inline]
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of identifiers skipped
    #[inline]
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Summary of [`crate::DatasetEncoder::encode_list`], as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeReport {
    pub list: PathBuf,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records: usize,
    pub failed: usize,
    pub failures: Vec<FailedIdentifier>,
}

impl EncodeReport {
    /// Build report from a finished pass
    #[must_use]
    pub fn new(
        list: PathBuf,
        output: PathBuf,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        summary: EncodeSummary,
    ) -> Self {
        Self {
            list,
            output,
            started_at,
            finished_at,
            records: summary.records,
            failed: summary.failures.len(),
            failures: summary.failures,
        }
    }

    /// Write as pretty JSON
    ///
    /// # Errors
    /// Returns [`EncodeError::Report`] if serialization or the write fails
    pub fn write_json(&self, path: &Path) -> Result<(), EncodeError> {
        let report_error = |source| EncodeError::Report {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_vec_pretty(self).map_err(|e| report_error(e.into()))?;
        std::fs::write(path, json).map_err(report_error)
    }

    /// Read a report written by [`write_json`](Self::write_json)
    ///
    /// # Errors
    /// Returns [`EncodeError::Report`] if the file is missing or not a report
    pub fn read_json(path: &Path) -> Result<Self, EncodeError> {
        let report_error = |source| EncodeError::Report {
            path: path.to_path_buf(),
            source,
        };
        let bytes = std::fs::read(path).map_err(report_error)?;
        serde_json::from_slice(&bytes).map_err(|e| report_error(e.into()))
    }
}
