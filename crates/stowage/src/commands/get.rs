use anyhow::Context;
use stowage_install::{DownloadOptions, download_files};
use stowage_manifest::parse_manifest;

use crate::cli::GetArgs;
use crate::config::Config;

pub fn run(config: &Config, args: GetArgs) -> anyhow::Result<()> {
    let mut downloader = super::http_downloader(config)?;
    let manifest = parse_manifest(&args.manifest, &mut downloader)
        .with_context(|| format!("cannot load manifest {}", args.manifest))?;
    tracing::debug!(files = manifest.files().count(), "manifest loaded");

    let options = DownloadOptions::new()
        .spider(args.spider)
        .force_overwrite(args.force)
        .safeguard_forced(args.safeguard);
    download_files(&manifest, &mut downloader, options)?;
    Ok(())
}
