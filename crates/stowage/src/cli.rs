use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(name = "stowage", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// State directory holding the registry and cached manifests.
    #[arg(long, global = true, env = "STOWAGE_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Fetch, verify and place every file of a manifest.
    #[command(alias = "g", name = "get")]
    Get(GetArgs),

    /// Track manifests and keep their files up to date.
    #[command(subcommand)]
    Pkg(PkgCommands),

    /// Print BLAKE3 digests of local files.
    #[command(alias = "d", name = "digest")]
    Digest(DigestArgs),
}

#[derive(Clone, Debug, Args)]
pub struct GetArgs {
    /// Manifest path or http(s) URL.
    pub manifest: String,

    /// Print `<url>   <path>` for each file without downloading.
    #[arg(long)]
    pub spider: bool,

    /// Overwrite existing outputs instead of backing them up.
    #[arg(short, long)]
    pub force: bool,

    /// With --force, still back up outputs that fail their declared digest.
    #[arg(long, requires = "force")]
    pub safeguard: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum PkgCommands {
    /// Start tracking a manifest source.
    #[command(alias = "a", name = "add")]
    Add(PkgAddArgs),

    /// Stop tracking a manifest by id or source.
    #[command(alias = "remove", name = "rm")]
    Rm(PkgRmArgs),

    /// List tracked manifests.
    #[command(alias = "list", name = "ls")]
    Ls,

    /// Refresh tracked manifests and reconcile their files.
    #[command(alias = "update", name = "up")]
    Up(PkgUpArgs),
}

#[derive(Clone, Debug, Args)]
pub struct PkgAddArgs {
    /// Manifest path or http(s) URL.
    pub source: String,
}

#[derive(Clone, Debug, Args)]
pub struct PkgRmArgs {
    /// Entry id or its source.
    pub key: String,
}

#[derive(Clone, Debug, Args)]
pub struct PkgUpArgs {
    /// Reinstall files even when nothing changed.
    #[arg(long)]
    pub redownload: bool,
}

#[derive(Clone, Debug, Args)]
pub struct DigestArgs {
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}
