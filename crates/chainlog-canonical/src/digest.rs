//! The digest function: SHA-256 over canonical bytes.

use sha2::{Digest, Sha256};

/// SHA-256 of the UTF-8 bytes of `input`, as 64 lowercase hex characters.
///
/// The input is hashed as raw bytes with no additional normalization, so
/// the result is stable across platforms.
pub fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
