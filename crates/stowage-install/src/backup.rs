//! Numbered `.bak` preservation of existing outputs.
//!
//! Two policies share one naming scheme: `path.bak`, then `path.bak.1` up to
//! `path.bak.999`, first free name wins. An existing backup is never
//! overwritten and a directory is never backed up.

use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use stowage_verify::verify_digest;
use tracing::info;

use crate::error::{Error, Result};

const MAX_BACKUP_INDEX: u32 = 999;

/// Move an existing file at `path` aside unconditionally.
///
/// Returns the backup path, or `None` when nothing was there.
pub fn backup_output_if_exists(path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    match existing(path)? {
        None => Ok(None),
        Some(_) => backup(path).map(Some),
    }
}

/// Move `path` aside only when its content differs from `expected`.
///
/// A blank `expected` or a missing file is a no-op. A file that still matches
/// is managed state and is left for an in-place overwrite.
pub fn backup_if_digest_mismatch(path: impl AsRef<Path>, expected: &str) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    if expected.trim().is_empty() || existing(path)?.is_none() {
        return Ok(None);
    }

    let check = verify_digest(path, expected)?;
    if check.matched {
        return Ok(None);
    }
    tracing::debug!(path = %path.display(), actual = %check.actual, "content differs from declared digest");
    backup(path).map(Some)
}

/// Metadata of `path` without following symlinks; directories are an error.
fn existing(path: &Path) -> Result<Option<Metadata>> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => Err(Error::BackupIsDirectory {
            path: path.to_path_buf(),
        }),
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn backup(path: &Path) -> Result<PathBuf> {
    let destination = next_backup_path(path)?;
    fs::rename(path, &destination).map_err(|source| {
        Error::Fs(stowage_fs::Error::Move {
            from: path.to_path_buf(),
            to: destination.clone(),
            source,
        })
    })?;
    info!(from = %path.display(), to = %destination.display(), "backed up existing output");
    Ok(destination)
}

fn next_backup_path(path: &Path) -> Result<PathBuf> {
    (0..=MAX_BACKUP_INDEX)
        .map(|index| backup_name(path, index))
        .find(|candidate| fs::symlink_metadata(candidate).is_err())
        .ok_or_else(|| Error::BackupExhausted {
            path: path.to_path_buf(),
        })
}

fn backup_name(path: &Path, index: u32) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    if index > 0 {
        name.push(format!(".{index}"));
    }
    PathBuf::from(name)
}
