//! Record construction.
//!
//! A record is the archive's on-disk unit for one asset: a directory named
//! by the asset's identifier, holding the original path, the raw bytes, the
//! sidecar and an optional preview. Records are built clear-then-write: any
//! stale directory for the same identifier is removed first, so re-exporting
//! into a reused staging area can never leave leftover slots (such as a
//! `preview` from a run that no longer produces one) behind.

use crate::PREVIEW_MAX_DIMENSION;
use crate::error::{ErrorKind, Result};
use crate::identity::Identity;
use bale_preview::{Bitmap, encode_png};
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

/// Record slot holding the asset's original project-relative path.
pub const PATHNAME: &str = "pathname";
/// Record slot holding the raw asset bytes (file assets only).
pub const ASSET: &str = "asset";
/// Record slot holding the sidecar bytes.
pub const ASSET_META: &str = "asset.meta";
/// Record slot holding the encoded preview image.
pub const PREVIEW: &str = "preview";

/// Builds the record directory for one asset under `staging`.
///
/// `pathname` stores the asset's path relative to `project_root` when the
/// asset lives under it, and the path unchanged otherwise — archives may
/// deliberately reference assets outside the primary project tree. A
/// missing source asset fails before anything is written, so no partial
/// record is left behind. Building twice with identical inputs produces
/// byte-identical output.
///
/// The preview bitmap, when given, is downsampled so neither dimension
/// exceeds [`PREVIEW_MAX_DIMENSION`] and encoded as lossless RGBA PNG; an
/// empty bitmap or a failed encode downgrades to "no preview".
///
/// # Errors
/// [`ErrorKind::MissingIdentity`] if the identifier is empty (joining an
/// empty identifier onto `staging` would name the staging directory itself,
/// and clear-then-write must never touch sibling records),
/// [`ErrorKind::MissingAsset`] if the asset doesn't exist,
/// [`ErrorKind::NonUtf8Path`] if its path can't be stored as UTF-8 text,
/// [`ErrorKind::Io`] for staging-area failures.
pub fn build_record(
    staging: &Path,
    asset_path: &Path,
    project_root: &Path,
    identity: &Identity,
    preview: Option<&Bitmap>,
) -> Result<PathBuf> {
    if identity.id.is_empty() {
        exn::bail!(ErrorKind::MissingIdentity(asset_path.to_path_buf()));
    }
    let Ok(metadata) = fs::metadata(asset_path) else {
        exn::bail!(ErrorKind::MissingAsset(asset_path.to_path_buf()));
    };
    let pathname = pathname_text(asset_path, project_root)?;

    // Safe under concurrent attempts; create_dir_all tolerates "already exists".
    fs::create_dir_all(staging).or_raise(|| ErrorKind::Io)?;
    let record_dir = staging.join(&identity.id);
    if record_dir.exists() {
        fs::remove_dir_all(&record_dir).or_raise(|| ErrorKind::Io)?;
    }
    fs::create_dir_all(&record_dir).or_raise(|| ErrorKind::Io)?;

    fs::write(record_dir.join(PATHNAME), pathname).or_raise(|| ErrorKind::Io)?;
    if metadata.is_file() {
        fs::copy(asset_path, record_dir.join(ASSET)).or_raise(|| ErrorKind::Io)?;
    }
    if let Some(sidecar) = &identity.sidecar {
        fs::write(record_dir.join(ASSET_META), sidecar).or_raise(|| ErrorKind::Io)?;
    }
    if let Some(bitmap) = preview
        && let Some(encoded) = encode_png(&bitmap.downsample(PREVIEW_MAX_DIMENSION))
    {
        fs::write(record_dir.join(PREVIEW), encoded).or_raise(|| ErrorKind::Io)?;
    }
    tracing::trace!(id = %identity.id, record = %record_dir.display(), "record written");
    Ok(record_dir)
}

/// The UTF-8 text stored in the `pathname` slot, always forward-slashed.
fn pathname_text(asset_path: &Path, project_root: &Path) -> Result<String> {
    let relative = asset_path.strip_prefix(project_root).unwrap_or(asset_path);
    match relative.to_str() {
        Some(text) => Ok(text.replace('\\', "/")),
        None => exn::bail!(ErrorKind::NonUtf8Path(asset_path.to_path_buf())),
    }
}
