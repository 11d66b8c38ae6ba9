use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Recursively copy `src` to `dest`.
///
/// Regular files keep their permission bits, directories are recreated with
/// the source's mode, and symlinks are recreated as symlinks pointing at the
/// same target instead of being followed.
pub fn copy_all(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let metadata = fs::symlink_metadata(src).map_err(|e| Error::Read {
        path: src.to_path_buf(),
        source: e,
    })?;
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        let target = fs::read_link(src).map_err(|e| Error::Read {
            path: src.to_path_buf(),
            source: e,
        })?;
        return crate::primitives::symlink::create_symlink(&target, dest);
    }

    if file_type.is_dir() {
        fs::create_dir_all(dest).map_err(|e| Error::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;

        for entry in fs::read_dir(src).map_err(|e| Error::Read {
            path: src.to_path_buf(),
            source: e,
        })? {
            let entry = entry.map_err(|e| Error::Read {
                path: src.to_path_buf(),
                source: e,
            })?;
            copy_all(entry.path(), dest.join(entry.file_name()))?;
        }

        fs::set_permissions(dest, metadata.permissions()).map_err(|e| Error::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;
        return Ok(());
    }

    // fs::copy carries the permission bits along with the contents.
    fs::copy(src, dest).map_err(|e| Error::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
