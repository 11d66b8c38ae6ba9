use std::env;
use std::path::PathBuf;

pub fn user_home() -> Option<PathBuf> { home::home_dir() }

/// Per-user data directory: `%LOCALAPPDATA%`, `~/Library/Application Support`,
/// or `$XDG_DATA_HOME` falling back to `~/.local/share`.
pub fn user_data() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var_os("LOCALAPPDATA").map(PathBuf::from)
    }
    #[cfg(target_os = "macos")]
    {
        user_home().map(|p| p.join("Library/Application Support"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        env::var_os("XDG_DATA_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| user_home().map(|p| p.join(".local/share")))
    }
}

/// Default stowage home under the user data directory, or the temp dir when
/// no home directory can be determined.
pub fn default_stowage_home() -> PathBuf {
    user_data()
        .unwrap_or_else(env::temp_dir)
        .join("stowage")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_home_ends_with_stowage() {
        assert!(default_stowage_home().ends_with("stowage"));
    }
}
