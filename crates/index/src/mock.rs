//! In-memory project index for testing.

use crate::error::{ErrorKind, Result};
use crate::{AssetId, ProjectIndex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Hand-populated project index for tests.
///
/// Entries are declared directly instead of being discovered by a walk, so
/// tests can describe exactly the shape of project they need without
/// touching the filesystem for the index itself.
///
/// # Examples
///
/// ```
/// use bale_index::{AssetId, MockIndex, ProjectIndex};
///
/// let index = MockIndex::default()
///     .with_asset("cc22", "/project/Assets/rock.png")
///     .with_root("aa00", ["cc22"]);
/// let assets = index.descendants_of(&AssetId::new("aa00")).unwrap();
/// assert_eq!(assets, [AssetId::new("cc22")]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockIndex {
    paths: BTreeMap<AssetId, PathBuf>,
    roots: BTreeMap<AssetId, Vec<AssetId>>,
}

impl MockIndex {
    /// Declares a concrete file asset.
    pub fn with_asset(mut self, id: impl Into<AssetId>, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(id.into(), path.into());
        self
    }

    /// Declares a root (folder-like) identifier and the file assets it
    /// expands to. Children don't need to be declared first, but every child
    /// must be declared as an asset before the index is queried; test setup
    /// that violates this shows up as an `UnknownId` error at query time.
    pub fn with_root(mut self, id: impl Into<AssetId>, children: impl IntoIterator<Item = impl Into<AssetId>>) -> Self {
        self.roots.insert(id.into(), children.into_iter().map(Into::into).collect());
        self
    }
}

impl ProjectIndex for MockIndex {
    fn descendants_of(&self, root: &AssetId) -> Result<Vec<AssetId>> {
        if let Some(children) = self.roots.get(root) {
            return Ok(children.clone());
        }
        if self.paths.contains_key(root) {
            return Ok(vec![root.clone()]);
        }
        exn::bail!(ErrorKind::UnknownId(root.to_string()));
    }

    fn path_for(&self, id: &AssetId) -> Result<PathBuf> {
        match self.paths.get(id) {
            Some(path) => Ok(path.clone()),
            None => exn::bail!(ErrorKind::UnknownId(id.to_string())),
        }
    }

    fn id_for_path(&self, path: &Path) -> Result<AssetId> {
        match self.paths.iter().find(|(_, p)| p.as_path() == path) {
            Some((id, _)) => Ok(id.clone()),
            None => exn::bail!(ErrorKind::UnknownPath(path.to_path_buf())),
        }
    }
}
