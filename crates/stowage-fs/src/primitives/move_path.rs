use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;

/// How a [`move_path`] call placed its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Renamed,
    Copied,
}

/// Move `src` to `dest`, falling back to copy-then-remove.
///
/// An atomic rename is tried first. When it fails (typically `EXDEV` across
/// filesystems) the tree is copied with modes preserved and the source is
/// removed, so the move succeeds without being atomic.
pub fn move_path(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<MoveKind> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    match fs::rename(src, dest) {
        Ok(()) => Ok(MoveKind::Renamed),
        Err(rename_err) => {
            tracing::debug!(
                from = %src.display(),
                to = %dest.display(),
                error = %rename_err,
                "rename failed, falling back to copy"
            );
            copy_then_remove(src, dest)?;
            Ok(MoveKind::Copied)
        }
    }
}

pub(crate) fn copy_then_remove(src: &Path, dest: &Path) -> Result<()> {
    crate::primitives::copy_all(src, dest).map_err(|e| match e {
        Error::Read { source, .. } | Error::Write { source, .. } => Error::Move {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            source,
        },
        other => other,
    })?;
    remove_path(src)
}

/// Move every top-level entry of `src_dir` into `dest_dir`.
///
/// Directories present on both sides are merged recursively. A destination
/// directory is never replaced by a file; that is an [`Error::IsDirectory`].
/// Any other existing destination entry is replaced by the incoming one.
pub fn merge_into(src_dir: impl AsRef<Path>, dest_dir: impl AsRef<Path>) -> Result<()> {
    let src_dir = src_dir.as_ref();
    let dest_dir = dest_dir.as_ref();

    fs::create_dir_all(dest_dir).map_err(|e| Error::Write {
        path: dest_dir.to_path_buf(),
        source: e,
    })?;

    let entries = fs::read_dir(src_dir).map_err(|e| Error::Read {
        path: src_dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::Read {
            path: src_dir.to_path_buf(),
            source: e,
        })?;
        let from = entry.path();
        let to = dest_dir.join(entry.file_name());

        let from_is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let to_is_dir = fs::symlink_metadata(&to)
            .map(|m| m.file_type().is_dir())
            .unwrap_or(false);

        if from_is_dir && to_is_dir {
            merge_into(&from, &to)?;
        } else if to_is_dir {
            return Err(Error::IsDirectory { path: to });
        } else {
            remove_path(&to)?;
            move_path(&from, &to)?;
        }
    }

    Ok(())
}

/// Remove a file, symlink or directory tree. A missing path is not an error.
pub fn remove_path(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let result = if metadata.file_type().is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Write {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
