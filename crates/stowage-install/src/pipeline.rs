//! Download pipeline.
//!
//! Each file entry goes through the same stages, strictly in manifest order:
//!
//! 1. Build the URL and resolve the planned output path.
//! 2. In spider mode print `<url>   <planned>` and move on.
//! 3. Back up whatever occupies the planned path, per [`DownloadOptions`].
//! 4. Download into a private temp file and check the artifact digest.
//! 5. Decode into place, check the content digest, apply mode and symlink.
//!
//! A failing entry never stops its siblings. The run reports
//! [`Error::Partial`] when at least one entry failed.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stowage_archive::{DecodeOptions, Encoding, decode_artifact};
use stowage_fetch::Downloader;
use stowage_manifest::{FileEntry, Manifest, check_entry, file_url, output_dir, planned_path};
use stowage_platform::expand_env;
use stowage_verify::verify_digest;
use tracing::{debug, info, warn};

use crate::backup::{backup_if_digest_mismatch, backup_output_if_exists};
use crate::diagnostics;
use crate::error::{Error, Failure, Result};

/// Switches for one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Print the plan without touching the network or the filesystem.
    pub spider:           bool,
    /// Overwrite existing outputs instead of backing them up first.
    pub force_overwrite:  bool,
    /// With `force_overwrite`, still back up outputs that fail their digest.
    pub safeguard_forced: bool,
}

impl DownloadOptions {
    pub fn new() -> Self { Self::default() }

    pub fn spider(mut self, spider: bool) -> Self {
        self.spider = spider;
        self
    }

    pub fn force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn safeguard_forced(mut self, safeguard: bool) -> Self {
        self.safeguard_forced = safeguard;
        self
    }
}

/// Run the pipeline over `manifest`, writing plan lines to stdout.
pub fn download_files<D>(manifest: &Manifest, downloader: &mut D, options: DownloadOptions) -> Result<()>
where
    D: Downloader + ?Sized,
{
    let stdout = io::stdout();
    download_files_to(manifest, downloader, options, &mut stdout.lock())
}

/// Run the pipeline over `manifest`, writing plan lines to `out`.
pub fn download_files_to<D, W>(
    manifest: &Manifest,
    downloader: &mut D,
    options: DownloadOptions,
    out: &mut W,
) -> Result<()>
where
    D: Downloader + ?Sized,
    W: Write + ?Sized,
{
    let mut failures = Vec::new();
    let mut total = 0;

    for (repo, entry) in manifest.files() {
        check_entry(repo, entry)?;
        total += 1;

        let url = file_url(&repo.base_url, &entry.file_name);
        let planned = match planned_path(entry) {
            Ok(path) => path,
            Err(error) => {
                warn!(%url, %error, "cannot plan file");
                failures.push(Failure::new(url, error.into()));
                continue;
            }
        };

        if options.spider {
            writeln!(out, "{url}   {}", planned.display()).map_err(Error::Output)?;
            continue;
        }

        if let Err(error) = install_entry(entry, &url, &planned, downloader, options) {
            warn!(%url, %error, "file failed");
            failures.push(Failure::new(url, error));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::Partial { total, failures })
    }
}

fn install_entry<D>(
    entry: &FileEntry,
    url: &str,
    planned: &Path,
    downloader: &mut D,
    options: DownloadOptions,
) -> Result<()>
where
    D: Downloader + ?Sized,
{
    let encoding = entry.encoding()?;
    let full_tree = encoding.is_archive() && entry.extract().is_none();

    // A whole-tree planned path is the output directory; there is nothing to
    // move aside.
    if !full_tree {
        guard_existing(entry, planned, options)?;
    }

    let artifact = tempfile::Builder::new()
        .prefix(".stowage-artifact-")
        .tempfile()
        .map_err(Error::TempFile)?
        .into_temp_path();

    let placed = fetch_and_decode(entry, url, planned, encoding, &artifact, downloader);
    diagnostics::record(artifact.close(), "failed to remove temporary artifact");
    let placed = placed?;

    let Some(output) = placed else {
        if entry.digest().is_some() {
            warn!(%url, "digest is ignored for whole-tree archive extraction");
        }
        info!(%url, dir = %planned.display(), "archive tree placed");
        return apply_symlink(entry);
    };

    let verified = verify_output(entry, &output).and_then(|()| apply_mode(entry, &output));
    if verified.is_ok() {
        info!(%url, path = %output.display(), "placed");
    }
    let linked = apply_symlink(entry);
    verified.and(linked)
}

fn guard_existing(entry: &FileEntry, planned: &Path, options: DownloadOptions) -> Result<()> {
    if !options.force_overwrite {
        backup_output_if_exists(planned)?;
    } else if options.safeguard_forced {
        if let Some(digest) = entry.digest() {
            backup_if_digest_mismatch(planned, digest)?;
        }
    }
    Ok(())
}

fn fetch_and_decode<D>(
    entry: &FileEntry,
    url: &str,
    planned: &Path,
    encoding: Encoding,
    artifact: &Path,
    downloader: &mut D,
) -> Result<Option<PathBuf>>
where
    D: Downloader + ?Sized,
{
    let bytes = downloader.download(url, artifact)?;
    debug!(%url, bytes, "artifact downloaded");

    if let Some(expected) = entry.artifact_digest() {
        let check = verify_digest(artifact, expected)?;
        if !check.matched {
            return Err(Error::ArtifactDigestMismatch {
                url:      url.to_string(),
                expected: expected.to_string(),
                actual:   check.actual,
            });
        }
    }

    let options = DecodeOptions::new(artifact, encoding);
    let options = if !encoding.is_archive() {
        options.output_path(planned)
    } else if entry.extract().is_none() {
        options.output_dir(planned)
    } else {
        options
            .output_dir(output_dir(entry))
            .extract(entry.extract())
            .rename(entry.rename())
    };

    Ok(decode_artifact(&options)?)
}

/// Check the decoded output; a mismatching output is removed.
fn verify_output(entry: &FileEntry, output: &Path) -> Result<()> {
    let Some(expected) = entry.digest() else {
        return Ok(());
    };

    let check = verify_digest(output, expected)?;
    if check.matched {
        return Ok(());
    }

    diagnostics::record(stowage_fs::remove_path(output), "failed to remove mismatching output");
    Err(Error::DigestMismatch {
        path:     output.to_path_buf(),
        expected: expected.to_string(),
        actual:   check.actual,
    })
}

fn apply_mode(entry: &FileEntry, output: &Path) -> Result<()> {
    if let Some(mode) = entry.mode() {
        stowage_fs::set_mode(output, stowage_fs::parse_mode(mode)?)?;
    }
    Ok(())
}

fn apply_symlink(entry: &FileEntry) -> Result<()> {
    let Some(spec) = &entry.symlink else {
        return Ok(());
    };

    let link = expand_env(spec.link.trim());
    let target = expand_env(spec.target.trim());
    if link.is_empty() || target.is_empty() {
        return Err(Error::IncompleteSymlink {
            link:   spec.link.clone(),
            target: spec.target.clone(),
        });
    }

    stowage_fs::replace_symlink(&*target, &*link)?;
    info!(link = %link, target = %target, "symlink updated");
    Ok(())
}
