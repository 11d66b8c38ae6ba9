use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use stowage_fs::Workspace;

use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::extract::unpack_tar;
use crate::format::{Encoding, TarCompress};
use crate::sanitize::{sanitize_entry_path, strip_root};

/// Inputs for [`decode_artifact`].
#[derive(Clone, Debug, Default)]
pub struct DecodeOptions {
    pub source:      PathBuf,
    pub encoding:    Encoding,
    pub output_path: Option<PathBuf>,
    pub output_dir:  Option<PathBuf>,
    pub extract:     Option<String>,
    pub rename:      Option<String>,
}

impl DecodeOptions {
    pub fn new(source: impl Into<PathBuf>, encoding: Encoding) -> Self {
        Self {
            source: source.into(),
            encoding,
            ..Self::default()
        }
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn extract(mut self, extract: Option<impl Into<String>>) -> Self {
        self.extract = extract.map(Into::into);
        self
    }

    pub fn rename(mut self, rename: Option<impl Into<String>>) -> Self {
        self.rename = rename.map(Into::into);
        self
    }

    /// The in-archive path to pull out, or `None` for the whole tree.
    pub fn single_entry(&self) -> Option<&str> {
        self.extract
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty() && *e != ".")
    }
}

/// Decode the staged artifact described by `options`.
///
/// Returns the single output path, or `None` when a whole archive tree was
/// merged into the output directory.
pub fn decode_artifact(options: &DecodeOptions) -> Result<Option<PathBuf>> {
    match options.encoding {
        Encoding::None => {
            let output = required_output_path(options)?;
            write_output(options, output, |src, out| io::copy(src, out).map(|_| ()))?;
            Ok(Some(output.to_path_buf()))
        }
        Encoding::Zstd => {
            let output = required_output_path(options)?;
            write_output(options, output, |src, out| zstd::stream::copy_decode(src, out))?;
            Ok(Some(output.to_path_buf()))
        }
        Encoding::Tar(codec) => extract_archive(options, codec),
    }
}

fn required_output_path(options: &DecodeOptions) -> Result<&Path> {
    options
        .output_path
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(Error::MissingOutputPath {
            encoding: options.encoding,
        })
}

fn write_output<F>(options: &DecodeOptions, output: &Path, decode: F) -> Result<()>
where
    F: FnOnce(&mut BufReader<File>, &mut File) -> io::Result<()>,
{
    let source = File::open(&options.source).map_err(|source| Error::Decode {
        path: options.source.clone(),
        source,
    })?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::ExtractionFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut out = File::create(output).map_err(|source| Error::ExtractionFailed {
        path: output.to_path_buf(),
        source,
    })?;

    if let Err(source) = decode(&mut BufReader::new(source), &mut out) {
        drop(out);
        if let Err(error) = fs::remove_file(output) {
            tracing::warn!(path = %output.display(), %error, "failed to remove partial output");
        }
        return Err(Error::Decode {
            path: options.source.clone(),
            source,
        });
    }

    Ok(())
}

fn extract_archive(options: &DecodeOptions, codec: TarCompress) -> Result<Option<PathBuf>> {
    let output_dir = options
        .output_dir
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(Error::MissingOutputDir {
            encoding: options.encoding,
        })?;

    let file = File::open(&options.source).map_err(|source| Error::Decode {
        path: options.source.clone(),
        source,
    })?;
    let reader = codec
        .decoder(BufReader::new(file))
        .map_err(|source| Error::Corrupted { source })?;

    let workspace = Workspace::new(output_dir)?;
    let entries = unpack_tar(reader, workspace.path())?;
    let bytes: u64 = entries
        .iter()
        .filter(|e| e.kind == EntryKind::File)
        .map(|e| e.size)
        .sum();
    tracing::debug!(
        archive = %options.source.display(),
        entries = entries.len(),
        bytes,
        "archive staged"
    );

    let Some(extract) = options.single_entry() else {
        workspace.commit()?;
        return Ok(None);
    };

    let missing = || Error::ExtractTargetMissing {
        extract: extract.to_string(),
    };
    let relative = sanitize_entry_path(extract)?.ok_or_else(missing)?;
    if fs::symlink_metadata(workspace.path().join(&relative)).is_err() {
        return Err(missing());
    }

    let name = options
        .rename
        .as_deref()
        .map(strip_root)
        .filter(|n| !n.as_os_str().is_empty())
        .or_else(|| relative.file_name().map(PathBuf::from))
        .ok_or_else(missing)?;

    let placed = workspace.commit_entry(&relative, &name)?;
    Ok(Some(placed))
}
