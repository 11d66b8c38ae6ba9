/// Incremental hash state fed by streaming readers.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

pub struct Blake3Hasher(blake3::Hasher);

impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().as_bytes().to_vec() }
}

impl Default for Blake3Hasher {
    fn default() -> Self { Self::new() }
}

impl Blake3Hasher {
    pub fn new() -> Self { Self(blake3::Hasher::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { blake3::hash(data).as_bytes().to_vec() }

    /// Lower-case hex digest of an in-memory buffer.
    pub fn hex_digest(data: &[u8]) -> String { blake3::hash(data).to_hex().to_string() }
}
