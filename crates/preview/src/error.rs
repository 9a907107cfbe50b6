//! Preview Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A preview error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for preview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The pixel buffer doesn't match the declared dimensions.
    #[display("pixel buffer of {actual} bytes does not match {width}x{height} RGBA dimensions")]
    Dimensions { width: u32, height: u32, actual: usize },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
