//! Adding and removing tracked sources.

use stowage_fetch::{Downloader, is_remote, load_raw_bytes};
use stowage_fs::{AtomicWriteOptions, atomic_write};
use stowage_install::diagnostics;
use stowage_manifest::parse_manifest_bytes;
use stowage_verify::Blake3Hasher;
use tracing::info;

use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::store::{Registry, RegistryEntry, cache_file_name};

/// Local sources are tracked by absolute path so later runs do not depend
/// on the working directory.
pub fn normalize_source(source: &str) -> String {
    let source = source.trim();
    if is_remote(source) {
        return source.to_string();
    }
    std::path::absolute(source)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| source.to_string())
}

/// Fetch `source`, check that it parses, cache it and track it.
///
/// The entry is stored without `updated_at`, so the next refresh treats it
/// as changed and installs its files.
pub fn add_source<S>(layout: &Layout, source: &str, sources: &mut S) -> Result<RegistryEntry>
where
    S: Downloader + ?Sized,
{
    let source = normalize_source(source);
    let bytes = load_raw_bytes(&source, sources).map_err(|error| Error::Load {
        source_location: source.clone(),
        error,
    })?;
    parse_manifest_bytes(&bytes)?;

    let mut registry = Registry::load(&layout.registry_path)?;
    let local_path = layout.manifests_dir.join(cache_file_name(&source));
    atomic_write(&local_path, &bytes, AtomicWriteOptions::new())?;

    let entry = RegistryEntry {
        id: registry.id_for(&source),
        source,
        local_path,
        digest: Blake3Hasher::hex_digest(&bytes),
        updated_at: None,
    };
    registry.upsert(entry.clone());
    registry.save(&layout.registry_path)?;

    info!(id = %entry.id, source = %entry.source, "tracking manifest");
    Ok(entry)
}

/// Stop tracking the entry whose id or source is `key`.
///
/// The cached manifest is deleted; installed files are left alone.
pub fn remove_source(layout: &Layout, key: &str) -> Result<RegistryEntry> {
    let mut registry = Registry::load(&layout.registry_path)?;
    let removed = registry
        .remove_by_id(key)
        .or_else(|| registry.remove_by_source(key))
        .or_else(|| registry.remove_by_source(&normalize_source(key)))
        .ok_or_else(|| Error::NotTracked(key.to_string()))?;
    registry.save(&layout.registry_path)?;

    if removed.local_path.starts_with(&layout.manifests_dir) {
        diagnostics::record(
            stowage_fs::remove_path(&removed.local_path),
            "failed to remove cached manifest",
        );
    }
    info!(id = %removed.id, source = %removed.source, "untracked manifest");
    Ok(removed)
}
