//! Content-derived cache keys.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the prompt digest
pub const CACHE_KEY_LEN: usize = 8;

fn hex_encode_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len().saturating_mul(2));
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Full lowercase hex SHA-256 of the prompt text
#[must_use]
pub fn prompt_digest(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hex_encode_lower(&hasher.finalize())
}

#[must_use]
pub fn key_from_digest(digest: &str) -> String {
    digest.chars().take(CACHE_KEY_LEN).collect()
}

/// Cache key for a prompt: the digest truncated to [`CACHE_KEY_LEN`]
#[must_use]
pub fn cache_key_for_prompt(prompt: &str) -> String {
    key_from_digest(&prompt_digest(prompt))
}

/// Whether `key` has the shape of a key we could have issued.
///
/// Used to reject caller input before it reaches a filesystem path.
#[must_use]
pub fn is_well_formed_key(key: &str) -> bool {
    key.len() == CACHE_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
