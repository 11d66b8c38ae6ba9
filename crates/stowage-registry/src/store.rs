//! Persisted set of tracked manifest sources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stowage_fs::{AtomicWriteOptions, atomic_write};
use stowage_verify::Blake3Hasher;

use crate::error::{Error, Result};

/// Length of the hex id minted for a source.
const ID_LEN: usize = 12;
/// Length of the hash prefix in cached manifest names.
const CACHE_PREFIX_LEN: usize = 8;
const DEFAULT_CACHE_NAME: &str = "manifest.yaml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub entries: Vec<RegistryEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub id:         String,
    /// URL or filesystem path the manifest is fetched from.
    pub source:     String,
    /// Cached copy of the last fetched manifest.
    pub local_path: PathBuf,
    /// Digest of the cached manifest bytes.
    pub digest:     String,
    /// Last time a refresh saw different bytes. Unset until the first refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Registry {
    /// Read the registry at `path`; a missing file is an empty registry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(Error::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overwrite the whole registry file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(self).map_err(Error::Encode)?;
        json.push(b'\n');
        atomic_write(path, &json, AtomicWriteOptions::new().sync(true))?;
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Option<&RegistryEntry> { self.entries.iter().find(|e| e.id == id) }

    pub fn get_by_source(&self, source: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.source == source)
    }

    /// Replace the entry with the same id, or append.
    pub fn upsert(&mut self, entry: RegistryEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<RegistryEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn remove_by_source(&mut self, source: &str) -> Option<RegistryEntry> {
        let index = self.entries.iter().position(|e| e.source == source)?;
        Some(self.entries.remove(index))
    }

    /// Id already assigned to `source`, or a freshly minted one.
    pub fn id_for(&self, source: &str) -> String {
        self.get_by_source(source)
            .map(|e| e.id.clone())
            .unwrap_or_else(|| entry_id(source))
    }
}

/// Stable id derived from a source string.
pub fn entry_id(source: &str) -> String {
    let mut hex = Blake3Hasher::hex_digest(source.as_bytes());
    hex.truncate(ID_LEN);
    hex
}

/// Cache file name for `source`: short hash plus a sanitized base name.
pub fn cache_file_name(source: &str) -> String {
    let mut prefix = Blake3Hasher::hex_digest(source.as_bytes());
    prefix.truncate(CACHE_PREFIX_LEN);

    let trimmed = source.split(['?', '#']).next().unwrap_or_default();
    let base: String = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let base = base.trim_start_matches('.');

    if base.is_empty() {
        format!("{prefix}-{DEFAULT_CACHE_NAME}")
    } else {
        format!("{prefix}-{base}")
    }
}
