//! Blake3 hashing of backup files

use std::io;
use std::path::Path;

/// Hash a file's contents with blake3.
pub fn hash_file(path: &Path) -> io::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap(path)?;
    Ok(hasher.finalize())
}

/// First 8 hex characters of a full hex digest, for display.
pub fn short_hash(hex: &str) -> &str {
    &hex[..hex.len().min(8)]
}
