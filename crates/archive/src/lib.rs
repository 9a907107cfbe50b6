//! Asset archive construction.
//!
//! Packages project assets into a portable archive a consumer can unpack and
//! re-import, preserving each asset's stable identity, original relative
//! path and (where meaningful) a preview image. The archive is a
//! gzip-compressed tar stream with one directory per asset identifier:
//!
//! ```text
//! <identifier>/pathname     original project-relative path, UTF-8
//! <identifier>/asset        raw asset bytes (file assets only)
//! <identifier>/asset.meta   sidecar bytes (when the asset has one)
//! <identifier>/preview      lossless RGBA PNG (when policy + renderer allow)
//! ```
//!
//! Identity is resolved per asset: the `guid:` line of a `.meta` sidecar
//! when one exists, otherwise the uppercase hex BLAKE3 digest of the asset's
//! contents. The entry point is [`export`] (or [`export_paths`] when the
//! caller holds paths instead of identifiers).

pub mod container;
pub mod error;
pub mod identity;
pub mod record;

mod export;

pub use self::export::{ExportOptions, export, export_paths};

/// Default extension required on archive output filenames.
pub const ARCHIVE_EXTENSION: &str = "unitypackage";

/// Neither preview dimension may exceed this after downsampling.
pub const PREVIEW_MAX_DIMENSION: u32 = 128;
