use std::path::Path;

use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Runtime;

use crate::{DownloadError, Downloader, Result};

/// Blocking HTTP downloader backed by reqwest on a private current-thread runtime.
pub struct HttpDownloader {
    runtime: Runtime,
    client:  Client,
}

impl HttpDownloader {
    pub fn new(user_agent: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DownloadError::Runtime)?;
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|source| DownloadError::Request {
                url: String::new(),
                source,
            })?;

        Ok(Self { runtime, client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&mut self, url: &str, dest: &Path) -> Result<u64> {
        let client = &self.client;
        self.runtime.block_on(async move {
            let request_err = |source| DownloadError::Request {
                url: url.to_string(),
                source,
            };
            let write_err = |source| DownloadError::Write {
                path: dest.to_path_buf(),
                source,
            };

            let mut response = client.get(url).send().await.map_err(request_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(DownloadError::Status {
                    url:    url.to_string(),
                    status: status.as_u16(),
                });
            }

            let mut file = tokio::fs::File::create(dest).await.map_err(write_err)?;
            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await.map_err(request_err)? {
                file.write_all(&chunk).await.map_err(write_err)?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(write_err)?;

            tracing::debug!(url, bytes = written, "download complete");
            Ok(written)
        })
    }
}
