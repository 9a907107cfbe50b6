//! Index Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The identifier is not known to this index.
    #[display("unknown identifier: {_0}")]
    UnknownId(#[error(not(source))] String),
    /// The path is not covered by this index.
    #[display("path not indexed: {}", _0.display())]
    UnknownPath(#[error(not(source))] PathBuf),
    /// The index root must be an absolute path to an existing directory.
    #[display("invalid index root: {}", _0.display())]
    InvalidRoot(#[error(not(source))] PathBuf),
    /// An I/O operation failed while walking the project tree.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}
