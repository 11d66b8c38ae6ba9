use std::fmt;
use std::io::{BufReader, Read};
use std::str::FromStr;

use crate::Error;

/// How a downloaded artifact is turned into its final output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Byte-for-byte copy.
    #[default]
    None,
    /// Single zstd stream decompressed to one file.
    Zstd,
    /// Tar archive, optionally compressed.
    Tar(TarCompress),
}

/// Compression codec wrapped around a tar stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCompress {
    None,
    Gzip,
    Xz,
    Zstd,
}

impl Encoding {
    /// Parse a manifest encoding tag. Absent, blank and `none` all mean passthrough.
    pub fn from_tag(tag: Option<&str>) -> Result<Self, Error> {
        match tag {
            Some(tag) => tag.parse(),
            None => Ok(Self::None),
        }
    }

    pub fn is_archive(self) -> bool { matches!(self, Self::Tar(_)) }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let encoding = match normalized.as_str() {
            "" | "none" => Self::None,
            "zstd" => Self::Zstd,
            "tar" => Self::Tar(TarCompress::None),
            "tar+gzip" | "tar+gz" | "tgz" => Self::Tar(TarCompress::Gzip),
            "tar+xz" | "txz" => Self::Tar(TarCompress::Xz),
            "tar+zstd" => Self::Tar(TarCompress::Zstd),
            _ => {
                return Err(Error::UnsupportedEncoding {
                    encoding: s.to_string(),
                });
            }
        };
        Ok(encoding)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::None => "none",
            Self::Zstd => "zstd",
            Self::Tar(TarCompress::None) => "tar",
            Self::Tar(TarCompress::Gzip) => "tar+gzip",
            Self::Tar(TarCompress::Xz) => "tar+xz",
            Self::Tar(TarCompress::Zstd) => "tar+zstd",
        };
        f.write_str(tag)
    }
}

impl TarCompress {
    /// Wrap `reader` in the decompressor for this codec.
    pub fn decoder<R: Read>(self, reader: R) -> std::io::Result<Decoder<R>> {
        Ok(match self {
            Self::None => Decoder::Passthrough(reader),
            Self::Gzip => Decoder::Gzip(Box::new(flate2::read::GzDecoder::new(reader))),
            Self::Xz => Decoder::Xz(Box::new(xz2::read::XzDecoder::new(reader))),
            Self::Zstd => Decoder::Zstd(Box::new(zstd::stream::read::Decoder::new(reader)?)),
        })
    }
}

/// Decoder wrapper for tar decompression.
pub enum Decoder<R: Read> {
    Passthrough(R),
    Gzip(Box<flate2::read::GzDecoder<R>>),
    Xz(Box<xz2::read::XzDecoder<R>>),
    Zstd(Box<zstd::stream::read::Decoder<'static, BufReader<R>>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Passthrough(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
            Self::Xz(d) => d.read(buf),
            Self::Zstd(d) => d.read(buf),
        }
    }
}
