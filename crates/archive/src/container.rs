//! Container assembly.
//!
//! The final distributable archive is a gzip-compressed tar stream with one
//! top-level directory per record, compatible with the consuming
//! ecosystem's unpacker. Nothing in here understands record contents; it
//! receives finished record directories and serializes them as-is.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Writes `record_dirs` into a gzip-compressed tar container at `output`.
///
/// Each record directory is added under its own name (the asset
/// identifier), so the container unpacks to exactly the staging layout. On
/// any mid-write failure the partial output file is removed before the
/// error propagates; a failed export never leaves a half-written archive at
/// the target path.
pub fn write(record_dirs: &[PathBuf], output: &Path) -> Result<()> {
    let file = File::create(output).or_raise(|| ErrorKind::Container)?;
    let encoder = GzEncoder::new(file, Compression::best());
    let mut builder = tar::Builder::new(encoder);
    if let Err(error) = append_records(&mut builder, record_dirs).and_then(|_| finish(builder)) {
        // Only cleanup; the original error is the one worth reporting.
        if let Err(remove) = fs::remove_file(output) {
            tracing::warn!(output = %output.display(), error = %remove, "failed to remove partial archive");
        }
        return Err(error);
    }
    tracing::debug!(records = record_dirs.len(), output = %output.display(), "container written");
    Ok(())
}

fn append_records(builder: &mut tar::Builder<GzEncoder<File>>, record_dirs: &[PathBuf]) -> Result<()> {
    for dir in record_dirs {
        let Some(name) = dir.file_name() else {
            exn::bail!(ErrorKind::Container);
        };
        builder.append_dir_all(name, dir).or_raise(|| ErrorKind::Container)?;
    }
    Ok(())
}

fn finish(builder: tar::Builder<GzEncoder<File>>) -> Result<()> {
    let encoder = builder.into_inner().or_raise(|| ErrorKind::Container)?;
    encoder.finish().or_raise(|| ErrorKind::Container)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ASSET, PATHNAME};
    use flate2::read::GzDecoder;
    use std::collections::BTreeSet;
    use std::io::Read;
    use tempfile::TempDir;

    const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

    fn record(staging: &Path, id: &str, pathname: &str, asset: &[u8]) -> PathBuf {
        let dir = staging.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PATHNAME), pathname).unwrap();
        fs::write(dir.join(ASSET), asset).unwrap();
        dir
    }

    #[test]
    fn container_is_gzipped_tar_of_records() {
        let staging = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let records = vec![
            record(staging.path(), "AAAA", "Assets/a.mat", b"one"),
            record(staging.path(), "BBBB", "Assets/b.png", b"two"),
        ];
        let output = out_dir.path().join("export.unitypackage");
        write(&records, &output).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert!(bytes.starts_with(&GZIP_MAGIC));

        let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        let mut entries = BTreeSet::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().into_owned();
            if path == "AAAA/asset" {
                let mut contents = Vec::new();
                entry.read_to_end(&mut contents).unwrap();
                assert_eq!(contents, b"one");
            }
            entries.insert(path.trim_end_matches('/').to_string());
        }
        for expected in ["AAAA", "AAAA/pathname", "AAAA/asset", "BBBB", "BBBB/pathname", "BBBB/asset"] {
            assert!(entries.contains(expected), "missing entry {expected}");
        }
    }

    #[test]
    fn unreadable_record_removes_partial_output() {
        let out_dir = TempDir::new().unwrap();
        let output = out_dir.path().join("export.unitypackage");
        let missing = vec![PathBuf::from("/nonexistent/record/dir")];
        assert!(write(&missing, &output).is_err());
        assert!(!output.exists());
    }
}
