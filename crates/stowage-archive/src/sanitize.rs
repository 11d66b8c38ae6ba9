use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Clean an archive entry name into a path relative to the extraction root.
///
/// Absolute names and names whose `..` components climb above the root are
/// rejected. Names that clean down to the root itself (`.`, `./`, empty)
/// return `None` so callers can skip them.
pub fn sanitize_entry_path(entry: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let entry = entry.as_ref();
    match normalize_relative(entry) {
        Some(clean) if clean.as_os_str().is_empty() => Ok(None),
        Some(clean) => Ok(Some(clean)),
        None => Err(Error::ZipSlip {
            entry: entry.to_path_buf(),
        }),
    }
}

/// Check a symlink stored at `symlink` (relative to the root) pointing at `target`.
///
/// The target must be relative and, resolved from the link's directory, must
/// stay inside the extraction root.
pub fn sanitize_symlink_target(target: impl AsRef<Path>, symlink: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let symlink = symlink.as_ref();

    if target.has_root() || target.is_absolute() {
        return Err(Error::AbsoluteSymlinkTarget {
            target: target.to_path_buf(),
            symlink: symlink.to_path_buf(),
        });
    }

    let resolved = symlink
        .parent()
        .map(|p| p.join(target))
        .unwrap_or_else(|| target.to_path_buf());

    if normalize_relative(&resolved).is_none() {
        return Err(Error::SymlinkEscape {
            target: target.to_path_buf(),
            symlink: symlink.to_path_buf(),
        });
    }

    Ok(())
}

/// Keep only the normal components of `name`.
///
/// Roots, drive prefixes, `.` and `..` are dropped, so joining the result onto
/// a directory always yields a descendant of that directory.
pub fn strip_root(name: impl AsRef<Path>) -> PathBuf {
    name.as_ref()
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Resolve `.` and `..` lexically. `None` when the path is rooted or escapes.
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut parts = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return None,
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::Normal(part) => parts.push(part),
        }
    }

    Some(parts.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_entry_is_kept() {
        let clean = sanitize_entry_path("bin/tool").unwrap();
        assert_eq!(clean, Some(PathBuf::from("bin/tool")));
    }

    #[test]
    fn inner_parent_components_are_resolved() {
        let clean = sanitize_entry_path("./pkg/../bin//tool").unwrap();
        assert_eq!(clean, Some(PathBuf::from("bin/tool")));
    }

    #[test]
    fn root_markers_are_skipped() {
        assert_eq!(sanitize_entry_path("./").unwrap(), None);
        assert_eq!(sanitize_entry_path(".").unwrap(), None);
        assert_eq!(sanitize_entry_path("a/..").unwrap(), None);
    }

    #[test]
    fn zip_slip_protection() {
        let malicious = if cfg!(windows) { "C:\\etc\\passwd" } else { "/etc/passwd" };
        assert!(matches!(sanitize_entry_path(malicious), Err(Error::ZipSlip { .. })));
        assert!(matches!(
            sanitize_entry_path("../../etc/passwd"),
            Err(Error::ZipSlip { .. })
        ));
        assert!(matches!(
            sanitize_entry_path("bin/../../escape"),
            Err(Error::ZipSlip { .. })
        ));
    }

    #[test]
    fn relative_symlink_within_root_is_allowed() {
        sanitize_symlink_target("../lib/libfoo.so", "bin/foo").unwrap();
        sanitize_symlink_target("tool", "bin/alias").unwrap();
    }

    #[test]
    fn symlink_absolute_path_rejected() {
        let absolute = if cfg!(windows) { "C:\\etc\\passwd" } else { "/etc/passwd" };
        assert!(matches!(
            sanitize_symlink_target(absolute, "bin/mylink"),
            Err(Error::AbsoluteSymlinkTarget { .. })
        ));
    }

    #[test]
    fn symlink_escaping_root_rejected() {
        assert!(matches!(
            sanitize_symlink_target("../../outside", "bin/mylink"),
            Err(Error::SymlinkEscape { .. })
        ));
    }

    #[test]
    fn strip_root_neutralizes_rooted_names() {
        assert_eq!(strip_root("/etc/passwd"), PathBuf::from("etc/passwd"));
        assert_eq!(strip_root("///tool"), PathBuf::from("tool"));
        assert_eq!(strip_root("../../tool"), PathBuf::from("tool"));
        assert_eq!(strip_root("tool"), PathBuf::from("tool"));
    }
}
