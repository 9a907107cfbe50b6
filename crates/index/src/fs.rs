//! Directory-walk project index.
//!
//! Builds the whole index up-front with one recursive walk: this keeps the
//! query trait synchronous and side-effect free, and matches how small
//! projects actually get exported (the walk is cheap compared to hashing
//! and archiving the asset bytes afterwards).

use crate::error::{ErrorKind, Result};
use crate::{AssetId, ProjectIndex};
use exn::ResultExt;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SIDECAR_EXTENSION: &str = "meta";
const SIDECAR_GUID_KEY: &str = "guid:";

#[derive(Debug, Clone)]
struct Entry {
    /// Path relative to the index root.
    rel: PathBuf,
    is_dir: bool,
}

/// In-memory project index built from a recursive directory walk.
///
/// Identifiers come from the `guid:` line of an asset's `.meta` sidecar when
/// one exists; assets without a sidecar are keyed by their root-relative
/// path. Either way the key is stable across walks of an unchanged tree.
/// Sidecar files themselves are never indexed, and directories are indexed
/// as traversal nodes only.
///
/// # Examples
///
/// ```no_run
/// use bale_index::{FsIndex, ProjectIndex};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let index = FsIndex::open("/absolute/path/to/project")?;
/// let root = index.id_for_path("Assets".as_ref())?;
/// for id in index.descendants_of(&root)? {
///     println!("{} -> {}", id, index.path_for(&id)?.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FsIndex {
    root: PathBuf,
    entries: BTreeMap<AssetId, Entry>,
    ids: BTreeMap<PathBuf, AssetId>,
}

impl FsIndex {
    /// Walks `root` and builds the index.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidRoot`] unless `root` is an absolute path
    /// to an existing directory, or [`ErrorKind::Io`] if the walk fails.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || !root.is_dir() {
            exn::bail!(ErrorKind::InvalidRoot(root));
        }
        let mut index = Self { root: root.clone(), entries: BTreeMap::new(), ids: BTreeMap::new() };
        index.walk(&root)?;
        tracing::debug!(root = %index.root.display(), assets = index.entries.len(), "project index built");
        Ok(index)
    }

    /// The absolute project root this index was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed assets (files and directories, sidecars excluded).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn walk(&mut self, dir: &Path) -> Result<()> {
        for entry in fs::read_dir(dir).or_raise(|| ErrorKind::Io)? {
            let entry = entry.or_raise(|| ErrorKind::Io)?;
            let path = entry.path();
            let is_dir = entry.file_type().or_raise(|| ErrorKind::Io)?.is_dir();
            if !is_dir && path.extension().is_some_and(|ext| ext == SIDECAR_EXTENSION) {
                continue;
            }
            let rel = path.strip_prefix(&self.root).or_raise(|| ErrorKind::Io)?.to_path_buf();
            let Some(id) = self.identifier(&path, &rel) else {
                tracing::warn!(path = %path.display(), "skipping asset with non-UTF-8 path and no sidecar");
                continue;
            };
            self.entries.insert(id.clone(), Entry { rel: rel.clone(), is_dir });
            self.ids.insert(rel, id);
            if is_dir {
                self.walk(&path)?;
            }
        }
        Ok(())
    }

    /// Identifier for one walked entry: the sidecar guid when one exists,
    /// the root-relative path otherwise.
    fn identifier(&self, path: &Path, rel: &Path) -> Option<AssetId> {
        if let Some(guid) = sidecar_guid(path) {
            return Some(AssetId::new(guid));
        }
        rel.to_str().map(|rel| AssetId::new(rel.replace('\\', "/")))
    }
}

impl ProjectIndex for FsIndex {
    fn descendants_of(&self, root: &AssetId) -> Result<Vec<AssetId>> {
        let Some(entry) = self.entries.get(root) else {
            exn::bail!(ErrorKind::UnknownId(root.to_string()));
        };
        if !entry.is_dir {
            return Ok(vec![root.clone()]);
        }
        let assets = self
            .ids
            .range(entry.rel.clone()..)
            .take_while(|(rel, _)| rel.starts_with(&entry.rel))
            .filter(|(_, id)| self.entries.get(id).is_some_and(|e| !e.is_dir))
            .map(|(_, id)| id.clone())
            .collect();
        Ok(assets)
    }

    fn path_for(&self, id: &AssetId) -> Result<PathBuf> {
        match self.entries.get(id) {
            Some(entry) => Ok(self.root.join(&entry.rel)),
            None => exn::bail!(ErrorKind::UnknownId(id.to_string())),
        }
    }

    fn id_for_path(&self, path: &Path) -> Result<AssetId> {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        match self.ids.get(rel) {
            Some(id) => Ok(id.clone()),
            None => exn::bail!(ErrorKind::UnknownPath(path.to_path_buf())),
        }
    }
}

/// Reads the `guid:` line out of the sidecar next to `path`, if any.
///
/// Unreadable or malformed sidecars yield `None` here; the walk only needs
/// *some* stable key, and strict sidecar validation belongs to identity
/// resolution at export time.
fn sidecar_guid(path: &Path) -> Option<String> {
    let mut sidecar = path.as_os_str().to_os_string();
    sidecar.push(".meta");
    let text = fs::read_to_string(PathBuf::from(sidecar)).ok()?;
    text.lines()
        .find_map(|line| line.strip_prefix(SIDECAR_GUID_KEY))
        .map(|guid| guid.trim().to_string())
        .filter(|guid| !guid.is_empty())
}
