use std::io::{self, Write};
use std::path::Path;

use stowage_verify::digest_file;

use crate::cli::DigestArgs;
use crate::error::{ErrorKind, Failed};

pub fn run(args: DigestArgs) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let failed = write_digests(&args.files, &mut stdout.lock())?;
    if failed > 0 {
        return Err(Failed::new(ErrorKind::Filesystem, format!("{failed} file(s) could not be read")).into());
    }
    Ok(())
}

/// Print `<hex>  <path>` per readable file; returns how many were unreadable.
fn write_digests<P: AsRef<Path>>(files: &[P], out: &mut impl Write) -> io::Result<usize> {
    let mut failed = 0;
    for file in files {
        let file = file.as_ref();
        match digest_file(file) {
            Ok(hex) => writeln!(out, "{hex}  {}", file.display())?,
            Err(error) => {
                tracing::error!(%error, "cannot hash file");
                failed += 1;
            }
        }
    }
    Ok(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_verify::Blake3Hasher;

    #[test]
    fn prints_sum_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "abc").unwrap();

        let mut out = Vec::new();
        let failed = write_digests(&[file.clone(), dir.path().join("missing")], &mut out).unwrap();

        assert_eq!(failed, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{}  {}\n", Blake3Hasher::hex_digest(b"abc"), file.display())
        );
    }
}
