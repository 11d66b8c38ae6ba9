//! Output path resolution.
//!
//! Everything here is lexical. Nothing touches the filesystem, so the same
//! answers come back in spider mode, during a real run and when a refresh
//! compares targets.

use std::path::{Component, Path, PathBuf};

use stowage_archive::strip_root;
use stowage_platform::expand_env;

use crate::data::{FileEntry, Manifest, Repository, Target};
use crate::error::{Error, Result};

/// Download URL for `file_name` under `base_url`.
///
/// Plain concatenation with a single `/`. A trailing slash on the base is
/// kept, so `https://host/dir/` yields `https://host/dir//file`.
pub fn file_url(base_url: &str, file_name: &str) -> String { format!("{base_url}/{file_name}") }

/// The entry's output directory with `$VAR`/`${VAR}` expanded, `.` if unset.
pub fn output_dir(entry: &FileEntry) -> PathBuf {
    match entry.out_dir.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(dir) => clean_path(Path::new(&*expand_env(dir))),
        None => PathBuf::from("."),
    }
}

/// Final on-disk path of a single-file output.
///
/// The name is the rename (stripped of root and `..`) when given, otherwise
/// the basename of the extracted entry for single-entry archive extraction,
/// otherwise the file name. The result never leaves [`output_dir`].
pub fn resolve_path(entry: &FileEntry) -> Result<PathBuf> {
    let dir = output_dir(entry);
    let name = output_name(entry)?;
    Ok(clean_path(&dir.join(name)))
}

/// Where the entry lands: [`resolve_path`], or the output directory itself
/// when a whole archive tree is unpacked.
pub fn planned_path(entry: &FileEntry) -> Result<PathBuf> {
    if is_full_tree(entry)? {
        return Ok(output_dir(entry));
    }
    resolve_path(entry)
}

/// `true` when the entry unpacks an entire archive into its output directory.
pub fn is_full_tree(entry: &FileEntry) -> Result<bool> {
    Ok(entry.encoding()?.is_archive() && entry.extract().is_none())
}

/// Resolved single-file targets of a manifest, in manifest order.
///
/// Whole-tree archive entries have no single output and are left out.
pub fn targets(manifest: &Manifest) -> Result<Vec<Target>> {
    let mut out = Vec::new();
    for (repo, entry) in manifest.files() {
        check_entry(repo, entry)?;
        if is_full_tree(entry)? {
            continue;
        }
        out.push(Target {
            path:   resolve_path(entry)?,
            digest: entry.digest().map(str::to_owned),
        });
    }
    Ok(out)
}

/// Reject entries that cannot name an output.
pub fn check_entry(repo: &Repository, entry: &FileEntry) -> Result<()> {
    if entry.file_name.trim().is_empty() {
        return Err(Error::MissingFileName {
            base_url: repo.base_url.clone(),
        });
    }
    Ok(())
}

fn output_name(entry: &FileEntry) -> Result<PathBuf> {
    if let Some(rename) = entry.rename() {
        let stripped = strip_root(rename);
        if !stripped.as_os_str().is_empty() {
            return Ok(stripped);
        }
    }

    if entry.encoding()?.is_archive() {
        if let Some(name) = entry.extract().and_then(|e| Path::new(e).file_name()) {
            return Ok(PathBuf::from(name));
        }
    }

    Ok(strip_root(entry.file_name.trim()))
}

/// Lexically normalize a path: drop `.`, fold `..` into its parent.
///
/// Leading `..` survive on relative paths and vanish under a root. An empty
/// result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}
