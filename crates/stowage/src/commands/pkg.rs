use std::io::{self, Write};

use anyhow::Context;
use stowage_registry::{Registry, RegistryEntry, add_source, remove_source, run_pkg_up};

use crate::cli::PkgCommands;
use crate::config::Config;
use crate::error::{ErrorKind, Failed};

pub fn run(config: &Config, cmd: PkgCommands) -> anyhow::Result<()> {
    match cmd {
        PkgCommands::Add(args) => {
            let mut sources = super::http_downloader(config)?;
            let entry = add_source(&config.layout(), &args.source, &mut sources)
                .with_context(|| format!("cannot track {}", args.source))?;
            println!("{}  {}", entry.id, entry.source);
        }
        PkgCommands::Rm(args) => {
            let entry = remove_source(&config.layout(), &args.key)?;
            println!("removed {}  {}", entry.id, entry.source);
        }
        PkgCommands::Ls => {
            let registry = Registry::load(&config.registry_path)?;
            let stdout = io::stdout();
            write_table(&registry.entries, &mut stdout.lock())?;
        }
        PkgCommands::Up(args) => {
            let mut sources = super::http_downloader(config)?;
            let mut downloader = super::http_downloader(config)?;
            let stdout = io::stdout();
            let report = run_pkg_up(
                &config.layout(),
                &mut sources,
                &mut downloader,
                args.redownload,
                &mut stdout.lock(),
            )?;
            let failed = report.failures().count();
            if failed > 0 {
                let message = format!("{failed} of {} tracked manifest(s) failed", report.results.len());
                return Err(Failed::new(ErrorKind::Partial, message).into());
            }
        }
    }
    Ok(())
}

fn write_table(entries: &[RegistryEntry], out: &mut impl Write) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "no tracked manifests");
    }

    writeln!(out, "{:<12}  {:<16}  SOURCE", "ID", "UPDATED")?;
    for entry in entries {
        let updated = entry
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        writeln!(out, "{:<12}  {:<16}  {}", entry.id, updated, entry.source)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn table_layout() {
        let entries = vec![RegistryEntry {
            id:         "0123456789ab".into(),
            source:     "https://example.com/tools.yaml".into(),
            local_path: PathBuf::from("/cache/x"),
            digest:     "d".into(),
            updated_at: None,
        }];

        let mut out = Vec::new();
        write_table(&entries, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "ID            UPDATED           SOURCE");
        assert_eq!(lines[1], "0123456789ab  never             https://example.com/tools.yaml");
    }
}
