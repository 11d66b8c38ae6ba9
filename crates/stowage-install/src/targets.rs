//! Drift detection and cleanup over resolved targets.

use std::fs;
use std::io;
use std::path::Path;

use stowage_manifest::{Manifest, Target, parse_manifest_bytes, targets};
use stowage_verify::verify_digest;
use tracing::{debug, info};

use crate::backup::backup_if_digest_mismatch;
use crate::error::{Error, Failure, Result};

/// Targets of the manifest cached at `path`.
pub fn extract_targets(path: impl AsRef<Path>) -> Result<Vec<Target>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = parse_manifest_bytes(&bytes)?;
    Ok(targets(&manifest)?)
}

/// Remove targets that are no longer managed.
///
/// A target whose content no longer matches its declared digest was edited
/// locally and is backed up instead of deleted. Missing targets are skipped.
/// Every target is attempted; failures are reported together.
pub fn cleanup_old_targets(targets: &[Target]) -> Result<()> {
    let failures: Vec<Failure> = targets
        .iter()
        .filter_map(|target| {
            cleanup_target(target)
                .err()
                .map(|error| Failure::new(target.path.display().to_string(), error))
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::Partial {
            total: targets.len(),
            failures,
        })
    }
}

fn cleanup_target(target: &Target) -> Result<()> {
    let path = &target.path;
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(Error::Read {
                path: path.clone(),
                source,
            });
        }
    };

    if let Some(digest) = target.digest.as_deref() {
        if metadata.is_file() && backup_if_digest_mismatch(path, digest)?.is_some() {
            return Ok(());
        }
    }

    stowage_fs::remove_path(path)?;
    info!(path = %path.display(), "removed stale target");
    Ok(())
}

/// `true` when any target is missing or fails its declared digest.
pub fn files_need_refresh(manifest: &Manifest) -> Result<bool> {
    for target in targets(manifest)? {
        if target_drifted(&target) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A target that cannot be read counts as drifted.
pub fn target_drifted(target: &Target) -> bool {
    if fs::symlink_metadata(&target.path).is_err() {
        debug!(path = %target.path.display(), "target missing");
        return true;
    }

    let Some(expected) = target.digest.as_deref() else {
        return false;
    };
    match verify_digest(&target.path, expected) {
        Ok(check) if check.matched => false,
        Ok(check) => {
            debug!(path = %target.path.display(), actual = %check.actual, "target digest differs");
            true
        }
        Err(error) => {
            debug!(path = %target.path.display(), %error, "target unreadable");
            true
        }
    }
}
