use std::io::{self, Read};

use crate::Hasher;

/// Streaming reader that hashes data as it passes through.
/// Wraps any `Read` source so bytes are touched once.
pub struct VerifiedReader<R, H> {
    reader: R,
    hasher: H,
    bytes:  u64,
}

impl<R, H> VerifiedReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
            bytes: 0,
        }
    }

    /// Number of bytes that have passed through the reader.
    pub fn bytes_read(&self) -> u64 { self.bytes }
}

impl<R: Read, H: Hasher> VerifiedReader<R, H> {
    /// Consume the reader and return the raw digest of everything read.
    pub fn finish(self) -> Vec<u8> { self.hasher.finalize() }

    /// Consume the reader and return the lower-case hex digest.
    pub fn finish_hex(self) -> String { hex::encode(self.finish()) }
}

impl<R: Read, H: Hasher> Read for VerifiedReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes += n as u64;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Blake3Hasher;
    use std::io::Cursor;

    #[test]
    fn hashes_everything_copied_through() {
        let data = b"test data for verification";
        let mut verified = VerifiedReader::new(Cursor::new(data), Blake3Hasher::new());

        let mut sink = Vec::new();
        io::copy(&mut verified, &mut sink).unwrap();

        assert_eq!(sink, data);
        assert_eq!(verified.bytes_read(), data.len() as u64);
        assert_eq!(verified.finish(), Blake3Hasher::digest(data));
    }

    #[test]
    fn partial_read_hashes_only_consumed_bytes() {
        let mut verified = VerifiedReader::new(Cursor::new(b"abcdef"), Blake3Hasher::new());
        let mut buffer = [0u8; 3];
        verified.read_exact(&mut buffer).unwrap();
        assert_eq!(verified.finish(), Blake3Hasher::digest(b"abc"));
    }
}
