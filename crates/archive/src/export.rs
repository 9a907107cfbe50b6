//! Archive assembly.
//!
//! Orchestrates a whole export: expands root identifiers through the
//! project index, resolves identity and builds a record per asset, then
//! hands the finished records to the container writer. Per-asset failures
//! exclude that asset and are logged; only output validation, root
//! expansion and the final container write are fatal.

use crate::container;
use crate::error::{ErrorKind, Result};
use crate::identity::{self, Identity};
use crate::record::build_record;
use bale_index::{AssetId, ProjectIndex};
use bale_preview::{Bitmap, PreviewRenderer, should_attempt_preview};
use exn::ResultExt;
use std::collections::BTreeSet;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::instrument;

/// Explicit per-export configuration.
///
/// Replaces what would otherwise be process-wide toggles; in particular
/// `include_previews` is threaded through the call instead of living in
/// global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Root the stored `pathname` slots are made relative to.
    pub project_root: PathBuf,
    /// Staging directory for record construction. `None` stages in a
    /// temporary directory that is cleaned up after the container is
    /// written.
    pub staging_dir: Option<PathBuf>,
    /// Whether to ask the renderer for preview images at all.
    pub include_previews: bool,
    /// Extension the output filename must carry (compared
    /// case-insensitively, without the leading dot).
    pub archive_extension: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            staging_dir: None,
            include_previews: true,
            archive_extension: crate::ARCHIVE_EXTENSION.to_string(),
        }
    }
}

enum Staging {
    Persistent(PathBuf),
    Temporary(TempDir),
}

impl Staging {
    fn path(&self) -> &Path {
        match self {
            Staging::Persistent(path) => path,
            Staging::Temporary(dir) => dir.path(),
        }
    }
}

/// Exports the assets below `roots` into an archive at `output`.
///
/// Each root identifier is expanded through the index into its transitive
/// set of concrete file assets (directories are expanded, not recorded),
/// every asset gets a record in the staging area, and the records are
/// assembled into one gzip-compressed tar container. Returns the absolute
/// path of the written archive.
///
/// Assets that fail identity resolution or record construction are logged
/// and excluded; the export continues without them. Running the same export
/// twice produces an equivalent archive — records are rebuilt
/// clear-then-write, so reusing a staging directory is safe.
///
/// # Errors
/// - [`ErrorKind::InvalidOutputName`] if `output` lacks the configured
///   archive extension. Nothing is written.
/// - [`ErrorKind::Index`] if a *root* identifier can't be expanded.
/// - [`ErrorKind::Container`] if the final container write fails; no
///   partial archive file is left at `output`.
#[instrument(skip_all, fields(roots = roots.len(), output = %output.display()))]
pub fn export(
    index: &dyn ProjectIndex,
    renderer: &dyn PreviewRenderer,
    options: &ExportOptions,
    roots: &[AssetId],
    output: &Path,
) -> Result<PathBuf> {
    if !has_archive_extension(output, &options.archive_extension) {
        exn::bail!(ErrorKind::InvalidOutputName(output.to_path_buf()));
    }

    let mut assets = BTreeSet::new();
    for root in roots {
        assets.extend(index.descendants_of(root).or_raise(|| ErrorKind::Index)?);
    }

    let staging = match &options.staging_dir {
        Some(dir) => Staging::Persistent(dir.clone()),
        None => Staging::Temporary(TempDir::new().or_raise(|| ErrorKind::Io)?),
    };

    let mut records = Vec::with_capacity(assets.len());
    let mut excluded = 0usize;
    for id in &assets {
        match stage_asset(index, renderer, options, staging.path(), id) {
            Ok(Some(record)) => records.push(record),
            // Deliberately not recorded (sidecar paths); not a failure.
            Ok(None) => {},
            Err(error) => {
                excluded += 1;
                tracing::warn!(asset = %id, reason = %error.deref(), "excluding asset from archive");
            },
        }
    }
    tracing::debug!(staged = records.len(), excluded, "staging complete");

    container::write(&records, output)?;
    fs::canonicalize(output).or_raise(|| ErrorKind::Io)
}

/// Convenience for callers holding project paths rather than identifiers:
/// maps each path to its root identifier through the index, then delegates
/// to [`export`].
pub fn export_paths(
    index: &dyn ProjectIndex,
    renderer: &dyn PreviewRenderer,
    options: &ExportOptions,
    paths: &[PathBuf],
    output: &Path,
) -> Result<PathBuf> {
    let mut roots = Vec::with_capacity(paths.len());
    for path in paths {
        roots.push(index.id_for_path(path).or_raise(|| ErrorKind::Index)?);
    }
    export(index, renderer, options, &roots, output)
}

/// Resolves, previews and records a single asset. `Ok(None)` means the
/// asset was deliberately not recorded (sidecar paths never are).
fn stage_asset(
    index: &dyn ProjectIndex,
    renderer: &dyn PreviewRenderer,
    options: &ExportOptions,
    staging: &Path,
    id: &AssetId,
) -> Result<Option<PathBuf>> {
    let path = index.path_for(id).or_raise(|| ErrorKind::Index)?;
    if identity::is_sidecar(&path) {
        return Ok(None);
    }
    let identity = identity::resolve(&path)?;
    let preview = preview_for(renderer, options, &path, id, &identity);
    build_record(staging, &path, &options.project_root, &identity, preview.as_ref()).map(Some)
}

fn preview_for(
    renderer: &dyn PreviewRenderer,
    options: &ExportOptions,
    path: &Path,
    id: &AssetId,
    identity: &Identity,
) -> Option<Bitmap> {
    if !options.include_previews || !path.is_file() || !should_attempt_preview(path) {
        return None;
    }
    let bitmap = renderer.render(id);
    if bitmap.is_none() {
        tracing::trace!(id = %identity.id, "renderer produced no preview");
    }
    bitmap
}

fn has_archive_extension(output: &Path, extension: &str) -> bool {
    output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{content_id, sidecar_path};
    use crate::record::{ASSET, ASSET_META, PATHNAME, PREVIEW};
    use bale_index::{FsIndex, MockIndex};
    use bale_preview::NullRenderer;
    use rstest::rstest;
    use tempfile::TempDir;

    /// Renderer that always hands back the same solid bitmap.
    struct SolidRenderer;

    impl PreviewRenderer for SolidRenderer {
        fn render(&self, _id: &AssetId) -> Option<Bitmap> {
            Some(Bitmap::new(256, 256, vec![0x55; 256 * 256 * 4]).unwrap())
        }
    }

    struct Project {
        root: TempDir,
        staging: TempDir,
        out: TempDir,
    }

    impl Project {
        fn new() -> Self {
            Self { root: TempDir::new().unwrap(), staging: TempDir::new().unwrap(), out: TempDir::new().unwrap() }
        }

        fn options(&self) -> ExportOptions {
            ExportOptions {
                project_root: self.root.path().to_path_buf(),
                staging_dir: Some(self.staging.path().to_path_buf()),
                ..ExportOptions::default()
            }
        }

        fn output(&self) -> PathBuf {
            self.out.path().join("export.unitypackage")
        }

        fn file(&self, rel: &str, contents: &[u8], sidecar: Option<&str>) -> PathBuf {
            let path = self.root.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, contents).unwrap();
            if let Some(sidecar) = sidecar {
                fs::write(sidecar_path(&path), sidecar).unwrap();
            }
            path
        }
    }

    #[rstest]
    #[case("export.unitypackage", true)]
    #[case("export.UNITYPACKAGE", true)]
    #[case("export.zip", false)]
    #[case("unitypackage", false)]
    #[case("export.unitypackage.bak", false)]
    fn archive_extension_validation(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(has_archive_extension(Path::new(name), "unitypackage"), expected);
    }

    #[test]
    fn exports_sidecar_and_content_identified_assets() {
        let project = Project::new();
        project.file("Assets/one.mat", b"material body", Some("fileFormatVersion: 2\nguid: AAAA\n"));
        project.file("Assets/two.bin", b"raw content", None);
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();

        let archive = export(&index, &NullRenderer, &project.options(), &[root], &project.output()).unwrap();
        assert!(archive.is_absolute());
        assert!(archive.exists());

        // Exactly two records: the sidecar guid and the content digest.
        let hashed = content_id(b"raw content");
        let mut names: Vec<String> = fs::read_dir(project.staging.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        let mut expected = vec!["AAAA".to_string(), hashed.clone()];
        expected.sort();
        assert_eq!(names, expected);

        let guid_record = project.staging.path().join("AAAA");
        assert_eq!(fs::read_to_string(guid_record.join(PATHNAME)).unwrap(), "Assets/one.mat");
        assert_eq!(fs::read(guid_record.join(ASSET)).unwrap(), b"material body");
        assert!(guid_record.join(ASSET_META).exists());

        let hashed_record = project.staging.path().join(&hashed);
        assert_eq!(fs::read_to_string(hashed_record.join(PATHNAME)).unwrap(), "Assets/two.bin");
        assert_eq!(fs::read(hashed_record.join(ASSET)).unwrap(), b"raw content");
        assert!(!hashed_record.join(ASSET_META).exists());
    }

    #[test]
    fn wrong_output_extension_fails_without_side_effects() {
        let project = Project::new();
        project.file("Assets/one.mat", b"x", Some("guid: AAAA\n"));
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();
        let output = project.out.path().join("export.zip");

        let error = export(&index, &NullRenderer, &project.options(), &[root], &output).unwrap_err();
        assert!(matches!(error.deref(), ErrorKind::InvalidOutputName(_)));
        assert!(!output.exists());
        assert_eq!(fs::read_dir(project.staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn output_extension_is_case_insensitive() {
        let project = Project::new();
        project.file("Assets/one.mat", b"x", Some("guid: AAAA\n"));
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();
        let output = project.out.path().join("export.UnityPackage");
        export(&index, &NullRenderer, &project.options(), &[root], &output).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn malformed_sidecar_excludes_only_that_asset() {
        let project = Project::new();
        project.file("Assets/good.mat", b"fine", Some("guid: AAAA\n"));
        project.file("Assets/bad.mat", b"broken", Some("fileFormatVersion: 2\n"));
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();

        export(&index, &NullRenderer, &project.options(), &[root], &project.output()).unwrap();
        assert!(project.staging.path().join("AAAA").exists());
        // Only the valid sibling made it in.
        assert_eq!(fs::read_dir(project.staging.path()).unwrap().count(), 1);
    }

    #[test]
    fn empty_guid_sidecar_excludes_the_asset_and_spares_siblings() {
        let project = Project::new();
        project.file("Assets/good.mat", b"fine", Some("guid: AAAA\n"));
        project.file("Assets/empty.mat", b"broken", Some("guid:\n"));
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();

        export(&index, &NullRenderer, &project.options(), &[root], &project.output()).unwrap();

        // The valid sibling's record survives intact, and nothing was
        // written at staging top level in place of a record directory.
        let good = project.staging.path().join("AAAA");
        assert_eq!(fs::read(good.join(ASSET)).unwrap(), b"fine");
        assert!(!project.staging.path().join(ASSET).exists());
        assert_eq!(fs::read_dir(project.staging.path()).unwrap().count(), 1);
    }

    #[test]
    fn previews_are_rendered_downsampled_and_policy_gated() {
        let project = Project::new();
        project.file("Assets/rock.png", b"pixels", Some("guid: AAAA\n"));
        project.file("Assets/Player.cs", b"class Player {}", Some("guid: BBBB\n"));
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();

        export(&index, &SolidRenderer, &project.options(), &[root], &project.output()).unwrap();

        let preview = project.staging.path().join("AAAA").join(PREVIEW);
        assert!(preview.exists());
        let bytes = fs::read(preview).unwrap();
        let mut reader = png::Decoder::new(bytes.as_slice()).read_info().unwrap();
        let mut buffer = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buffer).unwrap();
        assert_eq!((info.width, info.height), (128, 128));

        // Denylisted extension: no preview even though the renderer has one.
        assert!(!project.staging.path().join("BBBB").join(PREVIEW).exists());
    }

    #[test]
    fn previews_can_be_disabled_per_export() {
        let project = Project::new();
        project.file("Assets/rock.png", b"pixels", Some("guid: AAAA\n"));
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();
        let options = ExportOptions { include_previews: false, ..project.options() };

        export(&index, &SolidRenderer, &options, &[root], &project.output()).unwrap();
        assert!(!project.staging.path().join("AAAA").join(PREVIEW).exists());
    }

    #[test]
    fn unknown_root_is_fatal() {
        let project = Project::new();
        let index = MockIndex::default();
        let error =
            export(&index, &NullRenderer, &project.options(), &[AssetId::new("nope")], &project.output()).unwrap_err();
        assert!(matches!(error.deref(), ErrorKind::Index));
        assert!(!project.output().exists());
    }

    #[test]
    fn export_without_explicit_staging_uses_a_scratch_directory() {
        let project = Project::new();
        project.file("Assets/one.bin", b"contents", None);
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();
        let options = ExportOptions { staging_dir: None, ..project.options() };

        let archive = export(&index, &NullRenderer, &options, &[root], &project.output()).unwrap();
        assert!(archive.exists());
    }

    #[test]
    fn export_paths_maps_through_the_index() {
        let project = Project::new();
        project.file("Assets/one.bin", b"contents", None);
        let index = FsIndex::open(project.root.path()).unwrap();

        let archive = export_paths(
            &index,
            &NullRenderer,
            &project.options(),
            &[PathBuf::from("Assets/one.bin")],
            &project.output(),
        )
        .unwrap();
        assert!(archive.exists());
        assert!(project.staging.path().join(content_id(b"contents")).exists());
    }

    #[test]
    fn missing_asset_is_skipped_not_fatal() {
        let project = Project::new();
        let present = project.file("Assets/here.bin", b"x", None);
        let index = MockIndex::default()
            .with_asset("here", &present)
            .with_asset("gone", project.root.path().join("Assets/gone.bin"))
            .with_root("all", ["here", "gone"]);

        export(&index, &NullRenderer, &project.options(), &[AssetId::new("all")], &project.output()).unwrap();
        assert_eq!(fs::read_dir(project.staging.path()).unwrap().count(), 1);
    }

    #[test]
    fn reexport_into_reused_staging_is_idempotent() {
        let project = Project::new();
        project.file("Assets/one.bin", b"stable", None);
        let index = FsIndex::open(project.root.path()).unwrap();
        let root = index.id_for_path(Path::new("Assets")).unwrap();

        export(&index, &NullRenderer, &project.options(), &[root.clone()], &project.output()).unwrap();
        let record = project.staging.path().join(content_id(b"stable"));
        let before = fs::read(record.join(ASSET)).unwrap();

        export(&index, &NullRenderer, &project.options(), &[root], &project.output()).unwrap();
        assert_eq!(fs::read(record.join(ASSET)).unwrap(), before);
    }
}
