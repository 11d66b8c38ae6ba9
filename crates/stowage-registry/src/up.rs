//! Refresh engine behind `pkg up`.
//!
//! Every tracked manifest is handled on its own: refetch, cache, decide
//! whether outputs need work, then run the download pipeline with
//! safeguarded overwrites. The registry is written once at the end.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use stowage_fetch::{Downloader, load_raw_bytes};
use stowage_fs::{AtomicWriteOptions, atomic_write};
use stowage_install::{
    DownloadOptions, Target, cleanup_old_targets, diagnostics, download_files_to, extract_targets, files_need_refresh,
};
use stowage_manifest::{parse_manifest_bytes, targets};
use stowage_verify::Blake3Hasher;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::store::{Registry, RegistryEntry};

/// What happened to one tracked manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PkgUpOutcome {
    /// New manifest bytes; stale outputs cleaned and files installed.
    Refreshed,
    /// Same manifest, files reinstalled on request.
    RedownloadRequested,
    /// Same manifest and every target intact; nothing downloaded.
    Unchanged,
    /// Same manifest, but a target was missing or modified.
    Drifted,
    Failed(String),
}

impl PkgUpOutcome {
    fn status(&self) -> &'static str {
        match self {
            Self::Refreshed => "refreshed",
            Self::RedownloadRequested => "redownload requested",
            Self::Unchanged => "manifest unchanged",
            Self::Drifted => "files drifted",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for PkgUpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.status()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PkgUpResult {
    pub id:      String,
    pub source:  String,
    pub outcome: PkgUpOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PkgUpReport {
    pub results: Vec<PkgUpResult>,
}

impl PkgUpReport {
    pub fn failures(&self) -> impl Iterator<Item = &PkgUpResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, PkgUpOutcome::Failed(_)))
    }

    pub fn is_success(&self) -> bool { self.failures().next().is_none() }
}

/// Bring every tracked manifest and its outputs up to date.
///
/// Remote manifests are refetched through `sources`; artifacts go through
/// `downloader`. Status lines go to `out`. Per-entry failures end up in the
/// report; only registry load and save failures are returned as errors.
pub fn run_pkg_up<S, D, W>(
    layout: &Layout,
    sources: &mut S,
    downloader: &mut D,
    force: bool,
    out: &mut W,
) -> Result<PkgUpReport>
where
    S: Downloader + ?Sized,
    D: Downloader + ?Sized,
    W: Write + ?Sized,
{
    let mut registry = Registry::load(&layout.registry_path)?;
    let mut report = PkgUpReport::default();

    for entry in &mut registry.entries {
        let outcome = match refresh_entry(entry, sources, downloader, force, out) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(id = %entry.id, source = %entry.source, %error, "refresh failed");
                PkgUpOutcome::Failed(error.to_string())
            }
        };
        if matches!(outcome, PkgUpOutcome::Failed(_)) {
            diagnostics::record(writeln!(out, "{}: {outcome}", entry.source), "failed to write status");
        }

        report.results.push(PkgUpResult {
            id: entry.id.clone(),
            source: entry.source.clone(),
            outcome,
        });
    }

    registry.save(&layout.registry_path)?;
    Ok(report)
}

fn refresh_entry<S, D, W>(
    entry: &mut RegistryEntry,
    sources: &mut S,
    downloader: &mut D,
    force: bool,
    out: &mut W,
) -> Result<PkgUpOutcome>
where
    S: Downloader + ?Sized,
    D: Downloader + ?Sized,
    W: Write + ?Sized,
{
    let previous = diagnostics::record(
        extract_targets(&entry.local_path),
        "cannot read targets of the cached manifest",
    )
    .unwrap_or_default();

    let bytes = load_raw_bytes(&entry.source, sources).map_err(|error| Error::Load {
        source_location: entry.source.clone(),
        error,
    })?;
    let manifest = parse_manifest_bytes(&bytes)?;
    atomic_write(&entry.local_path, &bytes, AtomicWriteOptions::new())?;

    let digest = Blake3Hasher::hex_digest(&bytes);
    let changed = entry.updated_at.is_none() || !entry.digest.eq_ignore_ascii_case(&digest);
    entry.digest = digest;
    if changed {
        entry.updated_at = Some(Utc::now());
    }

    let outcome = if changed {
        PkgUpOutcome::Refreshed
    } else if force {
        PkgUpOutcome::RedownloadRequested
    } else if files_need_refresh(&manifest)? {
        PkgUpOutcome::Drifted
    } else {
        PkgUpOutcome::Unchanged
    };
    diagnostics::record(writeln!(out, "{}: {outcome}", entry.source), "failed to write status");

    if outcome == PkgUpOutcome::Unchanged {
        return Ok(outcome);
    }

    if changed {
        let current = targets(&manifest)?;
        let stale = stale_targets(previous, &current);
        debug!(id = %entry.id, stale = stale.len(), "cleaning previous targets");
        diagnostics::record(cleanup_old_targets(&stale), "failed to clean previous targets");
    }

    let options = DownloadOptions::new().force_overwrite(true).safeguard_forced(true);
    download_files_to(&manifest, downloader, options, out)?;
    Ok(outcome)
}

/// Previous targets whose paths the refreshed manifest no longer produces.
fn stale_targets(previous: Vec<Target>, current: &[Target]) -> Vec<Target> {
    let keep: HashSet<&PathBuf> = current.iter().map(|t| &t.path).collect();
    previous.into_iter().filter(|t| !keep.contains(&t.path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(path: &str) -> Target {
        Target {
            path:   PathBuf::from(path),
            digest: None,
        }
    }

    #[test]
    fn stale_targets_exclude_current_paths() {
        let stale = stale_targets(vec![target("a"), target("b"), target("c")], &[target("b"), target("d")]);
        assert_eq!(stale, vec![target("a"), target("c")]);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(PkgUpOutcome::Drifted.to_string(), "files drifted");
        assert_eq!(PkgUpOutcome::Failed("boom".into()).to_string(), "failed: boom");
    }
}
