use crate::{Error, Result};
use std::fs;
use std::path::Path;

pub(crate) fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).map_err(|e| Error::Write {
            path: link.to_path_buf(),
            source: e,
        })
    }

    #[cfg(windows)]
    {
        let resolved = link.parent().map(|p| p.join(target));
        let is_dir = resolved.map(|p| p.is_dir()).unwrap_or(false);
        let result = if is_dir {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.map_err(|e| Error::Write {
            path: link.to_path_buf(),
            source: e,
        })
    }
}

/// Point `link` at `target`, replacing whatever file or stale link is there.
///
/// The link's parent directory is created when missing. A real directory at
/// `link` is never removed.
pub fn replace_symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();

    if let Some(parent) = link.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    if let Ok(metadata) = fs::symlink_metadata(link) {
        if metadata.file_type().is_dir() {
            return Err(Error::IsDirectory {
                path: link.to_path_buf(),
            });
        }
        fs::remove_file(link).map_err(|e| Error::Write {
            path: link.to_path_buf(),
            source: e,
        })?;
    }

    create_symlink(target, link)
}
