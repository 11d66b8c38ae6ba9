use std::path::{Path, PathBuf};

/// On-disk locations of the registry file and the manifest cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub registry_path: PathBuf,
    pub manifests_dir: PathBuf,
}

impl Layout {
    /// `home/registry.json` and `home/manifests`.
    pub fn under(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref();
        Self {
            registry_path: home.join("registry.json"),
            manifests_dir: home.join("manifests"),
        }
    }
}
