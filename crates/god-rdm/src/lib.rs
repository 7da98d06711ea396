//! GOD RDM
//!
//! Loader for precomputed representational dissimilarity matrices. A file is
//! accepted only if it is square, its index column repeats the header labels
//! in order, and it equals its transpose within [`allclose`] tolerance.
//!
//! # Example
//!
//! ```rust,ignore
//! use god_rdm::RdmLocation;
//!
//! let rdm = RdmLocation::new("/data/rdms", "01", "perceptionTest", "V1").load()?;
//! let d = rdm.by_label("n01443537", "n01518878");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod location;
mod matrix;

pub use error::{Result, ValidationError};
pub use location::RdmLocation;
pub use matrix::{allclose, load_path, parse_rdm, Rdm, ATOL, RTOL};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
