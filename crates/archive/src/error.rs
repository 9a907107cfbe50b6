//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong
/// internally. Only [`InvalidOutputName`](ErrorKind::InvalidOutputName),
/// [`Index`](ErrorKind::Index) on a *root* identifier, and
/// [`Container`](ErrorKind::Container) abort a whole export; every other
/// kind excludes a single asset and lets the export continue.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The output filename doesn't carry the expected archive extension.
    #[display("output filename must end with the archive extension: {}", _0.display())]
    InvalidOutputName(#[error(not(source))] PathBuf),
    /// The source asset doesn't exist on disk.
    #[display("asset does not exist: {}", _0.display())]
    MissingAsset(#[error(not(source))] PathBuf),
    /// A sidecar exists but contains no `guid:` line.
    #[display("sidecar carries no guid line: {}", _0.display())]
    MalformedSidecar(#[error(not(source))] PathBuf),
    /// No sidecar and no readable content to derive an identifier from.
    #[display("no identity available for: {}", _0.display())]
    MissingIdentity(#[error(not(source))] PathBuf),
    /// The asset path can't be stored as UTF-8 text.
    #[display("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(#[error(not(source))] PathBuf),
    /// A project index query failed.
    #[display("project index query failed")]
    Index,
    /// An I/O operation on the staging area failed.
    #[display("I/O error")]
    Io,
    /// Writing the final container failed. Fatal for the whole export.
    #[display("failed to write archive container")]
    Container,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io | ErrorKind::Container)
    }
}
