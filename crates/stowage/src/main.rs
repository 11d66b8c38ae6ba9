use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::ErrorKind;

mod cli;
mod commands;
mod config;
mod error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::resolve(cli.home.as_deref(), env!("CARGO_PKG_VERSION"));
    tracing::debug!(home = %config.home.display(), "configuration resolved");

    let result = match cli.cmd {
        Commands::Get(args) => commands::get::run(&config, args),
        Commands::Pkg(cmd) => commands::pkg::run(&config, cmd),
        Commands::Digest(args) => commands::digest::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let kind = ErrorKind::of(&error);
            eprintln!("error: {error:#}");
            tracing::debug!(%kind, "exiting");
            ExitCode::from(kind.exit_code())
        }
    }
}

/// Logs go to stderr; stdout carries plan and status lines only.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
