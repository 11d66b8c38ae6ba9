use stowage_fetch::{Downloader, load_raw_bytes};

use crate::data::Manifest;
use crate::error::{Error, Result};

/// Parse manifest YAML.
pub fn parse_manifest_bytes(bytes: &[u8]) -> Result<Manifest> {
    serde_yaml::from_slice(bytes).map_err(|source| Error::Parse { source })
}

/// Load and parse a manifest from a local path or an HTTP(S) URL.
pub fn parse_manifest<D: Downloader + ?Sized>(location: &str, downloader: &mut D) -> Result<Manifest> {
    let bytes = load_raw_bytes(location, downloader).map_err(|source| Error::Load {
        location: location.to_string(),
        source,
    })?;
    parse_manifest_bytes(&bytes)
}
