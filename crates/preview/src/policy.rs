//! Thumbnail policy.

use std::path::Path;

// Derived experimentally from a full project export: these extensions never
// came back from the renderer with a meaningful preview. A denylist rather
// than an allowlist, because importers can be registered for anything.
const NO_PREVIEW_EXTENSIONS: &[&str] = &[
    "shader",
    "cs",
    "anim",
    "unity",
    "asset",
    "playable",
    "lighting",
    "usdc",
    "txt",
    "asmdef",
    "asmref",
    "bundle",
    "controller",
    "dll",
    "md",
    "xml",
    "json",
    "manifest",
    "jslib",
    "java",
    "ttf",
    "exp",
    "usdz",
    "mtl",
    "fbx",
    "fbm",
    "pdb",
    "usd",
    "prefab",
    "assbin",
    "mm",
    "iobj",
    "lib",
    "overridecontroller",
    "so",
    "plist",
    "zip",
    "7z",
    "unitypackage",
    "ipdb",
    "url",
];

/// Decides whether a preview should be *attempted* for an asset, purely from
/// its file extension (case-insensitive).
///
/// This is a heuristic, not a guarantee: a `true` here only means the asset
/// type isn't known to be preview-less. The renderer may still come back
/// empty-handed, which callers treat as "no preview" rather than an error.
///
/// # Examples
///
/// ```
/// use bale_preview::should_attempt_preview;
///
/// assert!(should_attempt_preview("Assets/rock.png".as_ref()));
/// assert!(!should_attempt_preview("Scripts/Player.cs".as_ref()));
/// ```
pub fn should_attempt_preview(path: &Path) -> bool {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        // No extension says nothing about the asset type; let the renderer try.
        return true;
    };
    let extension = extension.to_ascii_lowercase();
    !NO_PREVIEW_EXTENSIONS.contains(&extension.as_str())
}
