//! Content verification primitives for downloaded artifacts.
//!
//! Hashes stream through a [`VerifiedReader`], so a file is read once whether
//! the caller wants the digest for reporting or to enforce an expected value.
//! All digests are BLAKE3, rendered as lower-case hex.
//!
//! # Example
//!
//! ```
//! use std::io::Read;
//! use stowage_verify::{Blake3Hasher, VerifiedReader};
//!
//! let mut reader = VerifiedReader::new(&b"hello world"[..], Blake3Hasher::new());
//! let mut buffer = Vec::new();
//! reader.read_to_end(&mut buffer).unwrap();
//!
//! assert_eq!(reader.finish(), Blake3Hasher::digest(b"hello world"));
//! ```

pub use self::digest::{DigestCheck, digest_file, digests_match, verify_digest};
pub use self::error::{Result, VerifyError};
pub use self::hasher::{Blake3Hasher, Hasher};
pub use self::reader::VerifiedReader;

mod digest;
mod error;
mod hasher;
mod reader;
