pub mod digest;
pub mod get;
pub mod pkg;

use anyhow::Context;
use stowage_fetch::HttpDownloader;

use crate::config::Config;

fn http_downloader(config: &Config) -> anyhow::Result<HttpDownloader> {
    HttpDownloader::new(&config.user_agent()).context("failed to initialise HTTP client")
}
