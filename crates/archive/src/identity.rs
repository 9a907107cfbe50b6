//! Identity resolution.
//!
//! Every asset in an archive is keyed by a stable identifier. Two very
//! different asset classes have to end up under the same scheme:
//!
//! - assets with an externally assigned identity carry a `.meta` sidecar
//!   whose `guid:` line is the source of truth, stable across re-exports
//!   regardless of content changes;
//! - assets without a sidecar get a deterministic content-derived
//!   identifier, so re-exporting unchanged bytes yields the same key and
//!   any byte change yields a new one.
//!
//! Content-derived identifiers can collide across *distinct* assets only by
//! digest collision; that edge case is accepted and handled downstream by
//! last-write-wins record construction rather than avoidance machinery.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

const SIDECAR_SUFFIX: &str = ".meta";
const SIDECAR_GUID_KEY: &str = "guid:";

/// A resolved asset identity, together with the sidecar bytes it came from
/// (kept so the record builder doesn't read the sidecar twice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub sidecar: Option<Vec<u8>>,
}

/// Resolves the stable identifier for the asset at `path`.
///
/// # Errors
/// - [`ErrorKind::MalformedSidecar`] when a sidecar exists but carries no
///   `guid:` line. Reported, never silently defaulted.
/// - [`ErrorKind::MissingAsset`] when neither a sidecar nor the asset exist.
/// - [`ErrorKind::MissingIdentity`] when there is no sidecar and the asset
///   is a directory (nothing to hash).
///
/// # Examples
///
/// ```no_run
/// use bale_archive::identity::resolve;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let identity = resolve("Assets/Textures/rock.png".as_ref())?;
/// println!("{}", identity.id);
/// # Ok(())
/// # }
/// ```
pub fn resolve(path: &Path) -> Result<Identity> {
    let sidecar = sidecar_path(path);
    if sidecar.is_file() {
        let bytes = fs::read(&sidecar).or_raise(|| ErrorKind::Io)?;
        let id = sidecar_guid(&bytes, &sidecar)?;
        return Ok(Identity { id, sidecar: Some(bytes) });
    }
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => exn::bail!(ErrorKind::MissingAsset(path.to_path_buf())),
    };
    if !metadata.is_file() {
        // Directories without a sidecar have no content to derive a key from.
        exn::bail!(ErrorKind::MissingIdentity(path.to_path_buf()));
    }
    let bytes = fs::read(path).or_raise(|| ErrorKind::Io)?;
    Ok(Identity { id: content_id(&bytes), sidecar: None })
}

/// Sidecar naming convention: the asset's own filename plus `.meta`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut sidecar = path.as_os_str().to_os_string();
    sidecar.push(SIDECAR_SUFFIX);
    PathBuf::from(sidecar)
}

/// True when `path` itself denotes a sidecar file.
pub fn is_sidecar(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().ends_with(SIDECAR_SUFFIX.as_bytes())
}

/// Content-derived identifier: uppercase hex BLAKE3 digest, no separators.
pub fn content_id(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_ascii_uppercase()
}

/// Scans sidecar text for the first line starting with the literal `guid:`
/// token (case-sensitive, column zero) and returns the trimmed remainder.
/// A guid line with nothing after the token is as malformed as no guid line
/// at all; an empty identifier must never escape this function (records are
/// keyed by it on disk).
fn sidecar_guid(bytes: &[u8], sidecar: &Path) -> Result<String> {
    let text = String::from_utf8_lossy(bytes);
    for line in text.lines() {
        if let Some(guid) = line.strip_prefix(SIDECAR_GUID_KEY) {
            let guid = guid.trim();
            if guid.is_empty() {
                exn::bail!(ErrorKind::MalformedSidecar(sidecar.to_path_buf()));
            }
            return Ok(guid.to_string());
        }
    }
    exn::bail!(ErrorKind::MalformedSidecar(sidecar.to_path_buf()));
}
