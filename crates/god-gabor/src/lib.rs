//! GOD Gabor
//!
//! Banks of Gabor wavelet filters arranged as a convolution weight tensor
//! (`height x width x in_channels x out_channels`).
//!
//! # Example
//!
//! ```rust,ignore
//! use god_gabor::{filter_bank, BankConfig, StackMode};
//!
//! let bank = filter_bank(&BankConfig::new(4.0, 2.0).with_mode(StackMode::Crop))?;
//! assert_eq!(bank.shape()[3], 16);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod bank;
mod error;
mod kernel;

pub use bank::{filter_bank, hard_stack, BankConfig, StackMode};
pub use error::{GaborError, Result};
pub use kernel::{filter_size, gabor_kernel, GaborParams};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
