use crate::{Error, Result};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Private staging directory whose contents are committed into a destination.
///
/// Nothing is visible at the destination until a commit; the staging
/// directory is removed when the workspace is dropped, committed or not.
pub struct Workspace {
    staging:     TempDir,
    destination: PathBuf,
}

impl Workspace {
    pub fn new(destination: impl AsRef<Path>) -> Result<Self> {
        let staging = tempfile::Builder::new()
            .prefix("stowage-stage-")
            .tempdir()
            .map_err(|e| Error::Write {
                path: std::env::temp_dir(),
                source: e,
            })?;

        Ok(Self {
            staging,
            destination: destination.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path { self.staging.path() }

    pub fn destination(&self) -> &Path { &self.destination }

    /// Merge the whole staged tree into the destination directory.
    pub fn commit(self) -> Result<()> {
        crate::primitives::merge_into(self.staging.path(), &self.destination)
    }

    /// Move one staged entry to `destination/name`, replacing what is there.
    ///
    /// A staged directory is merged into an existing directory. An existing
    /// directory is never replaced by anything else.
    pub fn commit_entry(self, relative: impl AsRef<Path>, name: impl AsRef<Path>) -> Result<PathBuf> {
        let from = self.staging.path().join(relative);
        let to = self.destination.join(name);

        let parent = to.parent().unwrap_or(&self.destination);
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;

        let is_dir = |path: &Path| {
            std::fs::symlink_metadata(path)
                .map(|m| m.file_type().is_dir())
                .unwrap_or(false)
        };
        match (is_dir(&from), is_dir(&to)) {
            (true, true) => crate::primitives::merge_into(&from, &to)?,
            (false, true) => return Err(Error::IsDirectory { path: to }),
            _ => {
                crate::primitives::remove_path(&to)?;
                crate::primitives::move_path(&from, &to)?;
            }
        }
        Ok(to)
    }
}
