//! BLAKE3 hashing utilities for asset and bundle cache busting

use std::io::Read;

use blake3::Hasher;

use crate::error::{Result, fs};

/// Length in bytes of every hash produced here
pub const HASH_LEN: usize = blake3::OUT_LEN;

/// Hash everything `reader` yields.
///
/// The reader is consumed fully and dropped before this returns. `path` only
/// names the source in errors.
pub fn hash_reader(mut reader: impl Read, path: &str) -> Result<Vec<u8>> {
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| fs::read_failed(path, e.to_string()))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().as_bytes().to_vec())
}

/// Hash a byte slice
pub fn hash_bytes(bytes: &[u8]) -> Vec<u8> {
    blake3::hash(bytes).as_bytes().to_vec()
}

/// Incremental hasher over labelled fields.
///
/// Every field is followed by a NUL separator so that `("ab", "c")` and
/// `("a", "bc")` hash differently.
#[derive(Default)]
pub struct FieldHasher {
    hasher: Hasher,
}

impl FieldHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, value: impl AsRef<[u8]>) -> &mut Self {
        self.hasher.update(value.as_ref());
        self.hasher.update(b"\0");
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        self.hasher.finalize().as_bytes().to_vec()
    }
}

/// Lowercase hex encoding of a hash
pub fn to_hex(hash: &[u8]) -> String {
    hex::encode(hash)
}
