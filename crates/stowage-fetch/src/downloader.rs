use std::path::Path;

use crate::Result;

/// The single network seam: fetch `url` into the file at `dest`.
///
/// Returns the number of bytes written. Implementations must leave `dest`
/// holding exactly the response body on success.
pub trait Downloader {
    fn download(&mut self, url: &str, dest: &Path) -> Result<u64>;
}

impl<F> Downloader for F
where
    F: FnMut(&str, &Path) -> Result<u64>,
{
    fn download(&mut self, url: &str, dest: &Path) -> Result<u64> { self(url, dest) }
}
