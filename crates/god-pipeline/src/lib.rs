//! GOD Pipeline
//!
//! Turns an image list into a record file of fixed-geometry stimuli.
//!
//! # Core Concepts
//!
//! - [`Normalizer`]: square crop, cubic resize to `inner_px`, centre on a
//!   mid-gray `canvas_px` canvas
//! - [`DatasetEncoder`]: sequential fetch, extract, normalize, write; failed
//!   identifiers are skipped and reported, never fatal
//! - [`EncoderConfig`]: TOML configuration with environment credentials
//! - [`load_dataset`]: reads a record file back as centred tensors
//!
//! # Example
//!
//! ```rust,ignore
//! use god_pipeline::{init_tracing, DatasetEncoder, EncoderConfig};
//!
//! let config = EncoderConfig::load(Path::new("encoder.toml"))?;
//! init_tracing(&config.logging);
//! let encoder = DatasetEncoder::from_config(config)?;
//! let report = encoder.encode_list(Path::new("imageURL_test.csv")).await?;
//! println!("{} saved, {} failed", report.records, report.failed);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod manifest;
pub mod normalizer;
pub mod report;
pub mod telemetry;

pub use config::{EncoderConfig, ACCESS_KEY_ENV, USERNAME_ENV};
pub use dataset::{load_dataset, DatasetItem, CENTER_OFFSET};
pub use encoder::DatasetEncoder;
pub use error::{ConfigError, EncodeError, ManifestError, NormalizeError};
pub use manifest::{parse_image_list, read_image_list, LIST_COLUMNS};
pub use normalizer::{
    NormalizedTensor, Normalizer, StimulusGeometry, BACKGROUND, CANVAS_PX, INNER_PX, STIMULUS_DEGREES,
};
pub use report::{EncodeReport, EncodeSummary, FailedIdentifier, FailureStage};
pub use telemetry::{init_tracing, LoggingConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
