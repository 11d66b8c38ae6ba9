use std::fs::File;
use std::io;
use std::path::Path;

use crate::{Blake3Hasher, Result, VerifiedReader, VerifyError};

/// Outcome of comparing a file against an expected digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestCheck {
    pub matched: bool,
    pub actual:  String,
}

/// Stream `path` through BLAKE3 and return the lower-case hex digest.
pub fn digest_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| VerifyError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = VerifiedReader::new(file, Blake3Hasher::new());
    io::copy(&mut reader, &mut io::sink()).map_err(|e| VerifyError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(reader.finish_hex())
}

/// Compare `path` against `expected`.
///
/// `expected` is trimmed and compared case-insensitively. A blank `expected`
/// always matches, which lets call sites compute the digest without enforcing it.
pub fn verify_digest(path: impl AsRef<Path>, expected: &str) -> Result<DigestCheck> {
    let actual = digest_file(path)?;
    let matched = digests_match(expected, &actual);
    Ok(DigestCheck { matched, actual })
}

/// `true` when `expected` is blank or names the same digest as `actual`.
pub fn digests_match(expected: &str, actual: &str) -> bool {
    let expected = expected.trim();
    expected.is_empty() || expected.eq_ignore_ascii_case(actual.trim())
}
