use std::path::Path;

use crate::{DownloadError, Downloader, Result};

/// `true` for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Read the raw bytes behind a local path or an HTTP(S) URL.
///
/// Remote locations go through `downloader` into a private temp file which is
/// removed before returning.
pub fn load_raw_bytes<D: Downloader + ?Sized>(location: &str, downloader: &mut D) -> Result<Vec<u8>> {
    if !is_remote(location) {
        let path = Path::new(location);
        return std::fs::read(path).map_err(|source| DownloadError::Read {
            path: path.to_path_buf(),
            source,
        });
    }

    let tmp = tempfile::Builder::new()
        .prefix(".stowage-source-")
        .tempfile()
        .map_err(|source| DownloadError::Write {
            path: std::env::temp_dir(),
            source,
        })?
        .into_temp_path();

    downloader.download(location, &tmp)?;
    std::fs::read(&tmp).map_err(|source| DownloadError::Read {
        path: tmp.to_path_buf(),
        source,
    })
}
