use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use stowage_fetch::DownloadError;
use stowage_install::{DownloadOptions, Error, download_files_to};
use stowage_manifest::{FileEntry, Manifest, Repository, SymlinkSpec};
use stowage_verify::Blake3Hasher;
use tempfile::tempdir;

const BASE: &str = "https://example.com/releases";

/// Serves canned bodies by URL and counts calls.
struct Server {
    bodies: HashMap<String, Vec<u8>>,
    calls:  usize,
}

impl Server {
    fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            calls:  0,
        }
    }

    fn serve(mut self, file_name: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(format!("{BASE}/{file_name}"), body.into());
        self
    }

    fn run(&mut self, manifest: &Manifest, options: DownloadOptions) -> Result<(), Error> {
        let bodies = &self.bodies;
        let calls = &mut self.calls;
        let mut downloader = |url: &str, dest: &Path| -> stowage_fetch::Result<u64> {
            *calls += 1;
            let body = bodies
                .get(url)
                .ok_or_else(|| DownloadError::Status {
                    url:    url.to_string(),
                    status: 404,
                })?;
            fs::write(dest, body).unwrap();
            Ok(body.len() as u64)
        };
        download_files_to(manifest, &mut downloader, options, &mut Vec::new())
    }
}

fn manifest(files: Vec<FileEntry>) -> Manifest {
    Manifest::new(vec![Repository {
        comment: "test".into(),
        base_url: BASE.into(),
        files,
    }])
}

fn entry(file_name: &str, out_dir: &Path) -> FileEntry {
    FileEntry {
        file_name: file_name.into(),
        out_dir: Some(out_dir.display().to_string()),
        ..FileEntry::default()
    }
}

fn tar_gz(files: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, content, mode) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append_data(&mut header, name, *content).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

#[test]
fn second_run_backs_up_previous_output() {
    let dir = tempdir().unwrap();
    let m = manifest(vec![entry("notes.txt", dir.path())]);
    let mut server = Server::new().serve("notes.txt", "hello");

    server.run(&m, DownloadOptions::new()).unwrap();
    server.run(&m, DownloadOptions::new()).unwrap();
    server.run(&m, DownloadOptions::new()).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(dir.path().join("notes.txt.bak")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(dir.path().join("notes.txt.bak.1")).unwrap(), "hello");
    assert_eq!(server.calls, 3);
}

#[test]
fn force_overwrites_in_place() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "old").unwrap();
    let m = manifest(vec![entry("notes.txt", dir.path())]);

    Server::new()
        .serve("notes.txt", "new")
        .run(&m, DownloadOptions::new().force_overwrite(true))
        .unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "new");
    assert!(!dir.path().join("notes.txt.bak").exists());
}

#[test]
fn safeguard_only_preserves_edited_outputs() {
    let dir = tempdir().unwrap();
    let mut file = entry("config", dir.path());
    file.digest = Some(Blake3Hasher::hex_digest(b"managed"));
    let m = manifest(vec![file]);
    let options = DownloadOptions::new().force_overwrite(true).safeguard_forced(true);
    let mut server = Server::new().serve("config", "managed");

    fs::write(dir.path().join("config"), "managed").unwrap();
    server.run(&m, options).unwrap();
    assert!(!dir.path().join("config.bak").exists());

    fs::write(dir.path().join("config"), "edited by hand").unwrap();
    server.run(&m, options).unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("config.bak")).unwrap(), "edited by hand");
    assert_eq!(fs::read_to_string(dir.path().join("config")).unwrap(), "managed");
}

#[test]
fn matching_digest_succeeds() {
    let dir = tempdir().unwrap();
    let mut file = entry("data.bin", dir.path());
    file.digest = Some(Blake3Hasher::hex_digest(b"payload").to_uppercase());

    Server::new()
        .serve("data.bin", "payload")
        .run(&manifest(vec![file]), DownloadOptions::new())
        .unwrap();

    assert!(dir.path().join("data.bin").exists());
}

#[test]
fn mismatching_digest_removes_output() {
    let dir = tempdir().unwrap();
    let mut file = entry("data.bin", dir.path());
    file.digest = Some("ab".repeat(32));

    let err = Server::new()
        .serve("data.bin", "payload")
        .run(&manifest(vec![file]), DownloadOptions::new())
        .unwrap_err();

    assert!(err.to_string().contains("digest mismatch"));
    assert!(matches!(*err.failures()[0].error, Error::DigestMismatch { .. }));
    assert!(!dir.path().join("data.bin").exists());
}

#[test]
fn artifact_digest_mismatch_writes_nothing() {
    let dir = tempdir().unwrap();
    let payload = zstd::encode_all(&b"decoded content"[..], 3).unwrap();
    let mut file = entry("data.zst", dir.path());
    file.encoding = Some("zstd".into());
    file.rename = Some("data".into());
    file.artifact_digest = Some(Blake3Hasher::hex_digest(b"something else"));

    let err = Server::new()
        .serve("data.zst", payload)
        .run(&manifest(vec![file]), DownloadOptions::new())
        .unwrap_err();

    assert!(err.to_string().contains("artifact digest mismatch"));
    assert!(!dir.path().join("data").exists());
}

#[test]
fn zstd_with_both_digests() {
    let dir = tempdir().unwrap();
    let payload = zstd::encode_all(&b"decoded content"[..], 3).unwrap();
    let mut file = entry("data.zst", dir.path());
    file.encoding = Some("zstd".into());
    file.rename = Some("data".into());
    file.artifact_digest = Some(Blake3Hasher::hex_digest(&payload));
    file.digest = Some(Blake3Hasher::hex_digest(b"decoded content"));

    Server::new()
        .serve("data.zst", payload)
        .run(&manifest(vec![file]), DownloadOptions::new())
        .unwrap();

    assert_eq!(fs::read(dir.path().join("data")).unwrap(), b"decoded content");
}

#[cfg(unix)]
#[test]
fn extract_and_rename_applies_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let archive = tar_gz(&[("bin/tool", b"#!/bin/sh\necho tool\n", 0o644), ("README", b"readme", 0o644)]);
    let mut file = entry("tool.tar.gz", dir.path());
    file.encoding = Some("tar+gzip".into());
    file.extract = Some("bin/tool".into());
    file.rename = Some("tool".into());
    file.mode = Some("0755".into());
    file.digest = Some(Blake3Hasher::hex_digest(b"#!/bin/sh\necho tool\n"));

    Server::new()
        .serve("tool.tar.gz", archive)
        .run(&manifest(vec![file]), DownloadOptions::new())
        .unwrap();

    let tool = dir.path().join("tool");
    assert_eq!(fs::read(&tool).unwrap(), b"#!/bin/sh\necho tool\n");
    assert_eq!(fs::metadata(&tool).unwrap().permissions().mode() & 0o777, 0o755);
    assert!(!dir.path().join("README").exists());
}

#[test]
fn whole_tree_extraction_merges_into_out_dir() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("share")).unwrap();
    fs::write(dir.path().join("share/keep.txt"), "local").unwrap();
    let archive = tar_gz(&[("share/doc.txt", b"doc", 0o644), ("bin/tool", b"tool", 0o755)]);
    let mut file = entry("pkg.tar.gz", dir.path());
    file.encoding = Some("tar+gzip".into());
    file.digest = Some("ignored".into());

    Server::new()
        .serve("pkg.tar.gz", archive)
        .run(&manifest(vec![file]), DownloadOptions::new())
        .unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("share/doc.txt")).unwrap(), "doc");
    assert_eq!(fs::read_to_string(dir.path().join("share/keep.txt")).unwrap(), "local");
    assert_eq!(fs::read_to_string(dir.path().join("bin/tool")).unwrap(), "tool");
}

#[test]
fn rooted_rename_stays_inside_out_dir() {
    let dir = tempdir().unwrap();
    let mut file = entry("evil", dir.path());
    file.rename = Some("/etc/passwd".into());

    Server::new()
        .serve("evil", "not really")
        .run(&manifest(vec![file]), DownloadOptions::new())
        .unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("etc/passwd")).unwrap(), "not really");
}

#[test]
fn transport_failure_does_not_stop_siblings() {
    let dir = tempdir().unwrap();
    let m = manifest(vec![entry("missing.txt", dir.path()), entry("present.txt", dir.path())]);
    let mut server = Server::new().serve("present.txt", "here");

    let err = server.run(&m, DownloadOptions::new()).unwrap_err();

    assert_eq!(server.calls, 2);
    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].subject, format!("{BASE}/missing.txt"));
    assert!(matches!(*err.failures()[0].error, Error::Download(_)));
    assert!(dir.path().join("present.txt").exists());
    assert!(!dir.path().join("missing.txt").exists());
}

#[cfg(unix)]
#[test]
fn symlink_is_replaced() {
    let dir = tempdir().unwrap();
    let link = dir.path().join("bin/current");
    fs::create_dir_all(dir.path().join("bin")).unwrap();
    fs::File::create(&link).unwrap().write_all(b"stale").unwrap();

    let mut file = entry("tool-1.2", dir.path());
    file.symlink = Some(SymlinkSpec {
        link:   link.display().to_string(),
        target: "../tool-1.2".into(),
    });

    Server::new()
        .serve("tool-1.2", "binary")
        .run(&manifest(vec![file]), DownloadOptions::new())
        .unwrap();

    assert_eq!(fs::read_link(&link).unwrap(), Path::new("../tool-1.2"));
    assert_eq!(fs::read_to_string(&link).unwrap(), "binary");
}

#[test]
fn directory_at_planned_path_fails_that_file() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("occupied")).unwrap();
    let mut server = Server::new().serve("occupied", "x");

    let err = server
        .run(&manifest(vec![entry("occupied", dir.path())]), DownloadOptions::new())
        .unwrap_err();

    assert!(matches!(*err.failures()[0].error, Error::BackupIsDirectory { .. }));
    assert_eq!(server.calls, 0);
}

#[test]
fn forced_extract_keeps_directory_at_planned_path() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("tool")).unwrap();
    fs::write(dir.path().join("tool/user-notes.txt"), "mine").unwrap();

    let archive = tar_gz(&[("bin/tool", b"binary", 0o755)]);
    let mut file = entry("tool.tar.gz", dir.path());
    file.encoding = Some("tar+gzip".into());
    file.extract = Some("bin/tool".into());
    file.rename = Some("tool".into());

    let err = Server::new()
        .serve("tool.tar.gz", archive)
        .run(&manifest(vec![file]), DownloadOptions::new().force_overwrite(true))
        .unwrap_err();

    assert!(matches!(
        *err.failures()[0].error,
        Error::Archive(stowage_archive::Error::Fs(stowage_fs::Error::IsDirectory { .. }))
    ));
    assert_eq!(fs::read_to_string(dir.path().join("tool/user-notes.txt")).unwrap(), "mine");
}
