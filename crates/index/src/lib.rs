//! Project index capability for bale.
//!
//! The archive exporter never walks a project tree itself; it depends on
//! three read-only queries, expressed by the [`ProjectIndex`] trait:
//!
//! - expand a root identifier into the transitive set of concrete assets,
//! - resolve an identifier to a filesystem path,
//! - resolve a filesystem path back to an identifier.
//!
//! Any implementation satisfies the exporter's needs. [`FsIndex`] builds an
//! in-memory index from one recursive walk of a project root, reading
//! identifiers out of `.meta` sidecars where they exist. `MockIndex` (behind
//! the `mock` feature) is a hand-populated map for tests.

pub mod error;
mod fs;
#[cfg(feature = "mock")]
mod mock;

pub use self::fs::FsIndex;
#[cfg(feature = "mock")]
pub use self::mock::MockIndex;
use crate::error::Result;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// Stable string key naming one asset within a project index.
///
/// Identifiers are opaque to the exporter; the index decides what they look
/// like (externally assigned guids, synthesized keys, whatever) as long as
/// they are unique within one project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Read-only view of a project's asset database.
///
/// Implementations must be consistent: every identifier returned by
/// [`descendants_of`](Self::descendants_of) resolves through
/// [`path_for`](Self::path_for), and `id_for_path(path_for(id))` round-trips.
pub trait ProjectIndex {
    /// Expands a root identifier into the transitive set of concrete file
    /// assets below it. A root naming a single file expands to itself;
    /// directories are traversal nodes and never appear in the result.
    fn descendants_of(&self, root: &AssetId) -> Result<Vec<AssetId>>;

    /// Resolves an identifier to its filesystem path.
    fn path_for(&self, id: &AssetId) -> Result<PathBuf>;

    /// Resolves a project-relative filesystem path to its identifier.
    fn id_for_path(&self, path: &Path) -> Result<AssetId>;
}
