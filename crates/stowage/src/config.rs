use std::path::{Path, PathBuf};

use stowage_registry::Layout;

/// Resolved runtime settings, passed explicitly to every command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub home:          PathBuf,
    pub registry_path: PathBuf,
    pub manifests_dir: PathBuf,
    pub version:       String,
}

impl Config {
    /// Use `home` when given (flag or `STOWAGE_HOME`), else the per-user data dir.
    pub fn resolve(home: Option<&Path>, version: &str) -> Self {
        let home = home
            .map(Path::to_path_buf)
            .unwrap_or_else(stowage_platform::default_stowage_home);
        Self::with_home(home, version)
    }

    pub fn with_home(home: PathBuf, version: &str) -> Self {
        let layout = Layout::under(&home);
        Self {
            home,
            registry_path: layout.registry_path,
            manifests_dir: layout.manifests_dir,
            version: version.to_string(),
        }
    }

    pub fn layout(&self) -> Layout {
        Layout {
            registry_path: self.registry_path.clone(),
            manifests_dir: self.manifests_dir.clone(),
        }
    }

    pub fn user_agent(&self) -> String { format!("stowage/{}", self.version) }
}
