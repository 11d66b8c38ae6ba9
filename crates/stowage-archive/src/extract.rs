//! Tar extraction into a staging root.
//!
//! Every entry name is sanitized before anything touches the filesystem, so a
//! hostile archive can at worst fail the extraction; it cannot write outside
//! the root it was given.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use tar::EntryType;

use crate::entry::{Entry, EntryKind};
use crate::error::{Error, Result};
use crate::sanitize::{sanitize_entry_path, sanitize_symlink_target};

/// Unpack every entry of the tar stream in `reader` under `root`.
pub fn unpack_tar<R: Read>(reader: R, root: &Path) -> Result<Vec<Entry>> {
    let real_root = fs::canonicalize(root).map_err(|source| Error::ExtractionFailed {
        path: root.to_path_buf(),
        source,
    })?;
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();

    for entry in archive.entries().map_err(|source| Error::Corrupted { source })? {
        let mut entry = entry.map_err(|source| Error::Corrupted { source })?;

        let raw_path = entry.path().map_err(|_| Error::InvalidPath)?.into_owned();
        let (entry_type, mode, size) = {
            let header = entry.header();
            (header.entry_type(), header.mode().ok(), header.size().unwrap_or(0))
        };

        if entry_type == EntryType::XGlobalHeader {
            continue;
        }

        let Some(relative) = sanitize_entry_path(&raw_path)? else {
            continue;
        };
        let target = root.join(&relative);
        if let Some(parent) = relative.parent() {
            ensure_resolves_inside(root, &real_root, parent, &relative)?;
        }

        let kind = match entry_type {
            EntryType::Regular | EntryType::Continuous => {
                ensure_parent(&target)?;
                remove_symlink(&target)?;
                let mut out = File::create(&target).map_err(|source| Error::ExtractionFailed {
                    path: target.clone(),
                    source,
                })?;
                io::copy(&mut entry, &mut out).map_err(|source| Error::ExtractionFailed {
                    path: target.clone(),
                    source,
                })?;
                if let Some(mode) = mode {
                    stowage_fs::set_mode(&target, mode & 0o777)?;
                }
                EntryKind::File
            }
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|source| Error::ExtractionFailed {
                    path: target.clone(),
                    source,
                })?;
                EntryKind::Directory
            }
            EntryType::Symlink => {
                let link_target = link_name(&entry, &raw_path)?;
                sanitize_symlink_target(&link_target, &relative)?;
                ensure_parent(&target)?;
                stowage_fs::replace_symlink(&link_target, &target)?;
                EntryKind::Symlink {
                    target: link_target,
                }
            }
            EntryType::Link => {
                let link_target = link_name(&entry, &raw_path)?;
                let source_rel = sanitize_entry_path(&link_target)?.ok_or_else(|| Error::ZipSlip {
                    entry: link_target.clone(),
                })?;
                ensure_resolves_inside(root, &real_root, &source_rel, &relative)?;
                ensure_parent(&target)?;
                remove_symlink(&target)?;
                fs::hard_link(root.join(&source_rel), &target).map_err(|source| {
                    Error::ExtractionFailed {
                        path: target.clone(),
                        source,
                    }
                })?;
                EntryKind::HardLink { target: source_rel }
            }
            other => {
                return Err(Error::UnsupportedEntry {
                    path: raw_path,
                    kind: format!("{other:?}"),
                });
            }
        };

        tracing::trace!(path = %relative.display(), ?kind, size, ?mode, "extracted entry");
        entries.push(Entry {
            path: relative,
            size,
            mode,
            kind,
        });
    }

    Ok(entries)
}

fn link_name<R: Read>(entry: &tar::Entry<'_, R>, raw_path: &Path) -> Result<std::path::PathBuf> {
    entry
        .link_name()
        .map_err(|_| Error::InvalidPath)?
        .map(|p| p.into_owned())
        .ok_or_else(|| Error::MissingLinkTarget {
            path: raw_path.to_path_buf(),
        })
}

/// Walk `relative` under `root` and reject it when an existing symlink along
/// the way really resolves outside `real_root`.
///
/// Lexical checks alone miss chains such as `a -> ..` followed by
/// `b -> ../a/..`. The walk stops at the first component that does not exist
/// yet, since everything below it is created fresh under a checked directory.
fn ensure_resolves_inside(root: &Path, real_root: &Path, relative: &Path, entry: &Path) -> Result<()> {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        current.push(component);
        let metadata = match fs::symlink_metadata(&current) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(Error::ExtractionFailed {
                    path: current,
                    source,
                });
            }
        };
        if !metadata.file_type().is_symlink() {
            continue;
        }

        let escapes = fs::canonicalize(&current).map_or(true, |resolved| !resolved.starts_with(real_root));
        if escapes {
            return Err(Error::ZipSlip {
                entry: entry.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Drop a symlink sitting where a file is about to be written, so the write
/// cannot follow it.
fn remove_symlink(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            fs::remove_file(path).map_err(|source| Error::ExtractionFailed {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::ExtractionFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn tar_with(build: impl FnOnce(&mut tar::Builder<Vec<u8>>)) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        build(&mut builder);
        builder.into_inner().unwrap()
    }

    fn file_header(size: u64, mode: u32) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_size(size);
        header.set_mode(mode);
        header.set_entry_type(EntryType::Regular);
        header
    }

    #[test]
    fn extracts_files_directories_and_links() {
        let data = tar_with(|b| {
            let mut dir = tar::Header::new_gnu();
            dir.set_entry_type(EntryType::Directory);
            dir.set_mode(0o755);
            dir.set_size(0);
            b.append_data(&mut dir, "pkg/", io::empty()).unwrap();

            let mut file = file_header(5, 0o755);
            b.append_data(&mut file, "pkg/tool", &b"hello"[..]).unwrap();

            let mut link = tar::Header::new_gnu();
            link.set_entry_type(EntryType::Symlink);
            link.set_size(0);
            b.append_link(&mut link, "pkg/alias", "tool").unwrap();

            let mut hard = tar::Header::new_gnu();
            hard.set_entry_type(EntryType::Link);
            hard.set_size(0);
            b.append_link(&mut hard, "pkg/copy", "pkg/tool").unwrap();
        });

        let root = tempfile::tempdir().unwrap();
        let entries = unpack_tar(Cursor::new(data), root.path()).unwrap();

        assert_eq!(entries.len(), 4);
        let kinds: Vec<_> = entries.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(kinds, vec![
            EntryKind::Directory,
            EntryKind::File,
            EntryKind::Symlink {
                target: PathBuf::from("tool"),
            },
            EntryKind::HardLink {
                target: PathBuf::from("pkg/tool"),
            },
        ]);
        assert_eq!(entries[1].size, 5);
        assert_eq!(entries[1].mode, Some(0o755));
        assert_eq!(fs::read_to_string(root.path().join("pkg/tool")).unwrap(), "hello");
        assert_eq!(fs::read_to_string(root.path().join("pkg/copy")).unwrap(), "hello");
        #[cfg(unix)]
        assert_eq!(
            fs::read_link(root.path().join("pkg/alias")).unwrap(),
            Path::new("tool")
        );
    }

    fn symlink(b: &mut tar::Builder<Vec<u8>>, path: &str, target: &str) {
        let mut link = tar::Header::new_gnu();
        link.set_entry_type(EntryType::Symlink);
        link.set_size(0);
        b.append_link(&mut link, path, target).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn symlink_chain_cannot_escape_root() {
        let data = tar_with(|b| {
            symlink(b, "sub/a", "..");
            symlink(b, "sub/b", "../sub/a/..");
            let mut file = file_header(4, 0o644);
            b.append_data(&mut file, "sub/b/escaped", &b"gone"[..]).unwrap();
        });

        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("stage");
        fs::create_dir(&root).unwrap();

        let result = unpack_tar(Cursor::new(data), &root);
        assert!(matches!(result, Err(Error::ZipSlip { .. })));
        assert!(!outer.path().join("escaped").exists());
    }

    #[cfg(unix)]
    #[test]
    fn hard_link_through_escaping_symlink_is_rejected() {
        let data = tar_with(|b| {
            symlink(b, "sub/a", "..");
            symlink(b, "sub/b", "../sub/a/..");
            let mut hard = tar::Header::new_gnu();
            hard.set_entry_type(EntryType::Link);
            hard.set_size(0);
            b.append_link(&mut hard, "copy", "sub/b/secret").unwrap();
        });

        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret"), "outside").unwrap();
        let root = outer.path().join("stage");
        fs::create_dir(&root).unwrap();

        let result = unpack_tar(Cursor::new(data), &root);
        assert!(matches!(result, Err(Error::ZipSlip { .. })));
        assert!(!root.join("copy").exists());
    }

    #[cfg(unix)]
    #[test]
    fn writes_through_symlinks_inside_root() {
        let data = tar_with(|b| {
            let mut dir = tar::Header::new_gnu();
            dir.set_entry_type(EntryType::Directory);
            dir.set_mode(0o755);
            dir.set_size(0);
            b.append_data(&mut dir, "lib64/", io::empty()).unwrap();
            symlink(b, "lib", "lib64");
            let mut file = file_header(2, 0o644);
            b.append_data(&mut file, "lib/x.so", &b"so"[..]).unwrap();
        });

        let root = tempfile::tempdir().unwrap();
        unpack_tar(Cursor::new(data), root.path()).unwrap();
        assert_eq!(fs::read_to_string(root.path().join("lib64/x.so")).unwrap(), "so");
    }

    #[test]
    fn rejects_absolute_symlink() {
        let data = tar_with(|b| {
            let mut link = tar::Header::new_gnu();
            link.set_entry_type(EntryType::Symlink);
            link.set_size(0);
            b.append_link(&mut link, "evil", "/etc/passwd").unwrap();
        });

        let root = tempfile::tempdir().unwrap();
        let result = unpack_tar(Cursor::new(data), root.path());
        assert!(matches!(result, Err(Error::AbsoluteSymlinkTarget { .. })));
    }

    #[test]
    fn rejects_unsupported_entry_types() {
        let data = tar_with(|b| {
            let mut fifo = tar::Header::new_gnu();
            fifo.set_entry_type(EntryType::Fifo);
            fifo.set_size(0);
            b.append_data(&mut fifo, "pipe", io::empty()).unwrap();
        });

        let root = tempfile::tempdir().unwrap();
        let result = unpack_tar(Cursor::new(data), root.path());
        assert!(matches!(result, Err(Error::UnsupportedEntry { .. })));
    }

    #[test]
    fn empty_archive_extracts_nothing() {
        let data = tar_with(|_| {});
        let root = tempfile::tempdir().unwrap();
        assert!(unpack_tar(Cursor::new(data), root.path()).unwrap().is_empty());
    }
}
