//! GOD Records
//!
//! Append-only record files of `(image name, encoded image)` examples.
//!
//! # Core Concepts
//!
//! - [`RecordSink`]: the append-only destination the dataset encoder writes to
//! - [`TfRecordWriter`] / [`TfRecordReader`]: checksummed length-delimited framing
//! - [`RecordExample`]: the two-feature payload (`image`, `imagename`)
//! - [`encode_png16`] / [`decode_png16`]: 16-bit grayscale image payloads
//!
//! # Example
//!
//! ```rust,ignore
//! use god_records::{encode_png16, RecordSink, TfRecordWriter};
//!
//! let mut sink = TfRecordWriter::create(&path)?;
//! sink.append("n01443537_22563.JPEG", &encode_png16(tensor.view())?)?;
//! sink.finish()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod crc;
pub mod error;
pub mod example;
pub mod framing;
pub mod png16;

pub use crc::{crc32c, masked_crc32c};
pub use error::{RecordError, RecordResult};
pub use example::{Example, Feature, RecordExample, IMAGE_FEATURE, NAME_FEATURE};
pub use framing::{read_examples, RecordSink, TfRecordReader, TfRecordWriter, RECORD_EXTENSION};
pub use png16::{decode_png16, encode_png16, quantize, PNG16_SCALE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
