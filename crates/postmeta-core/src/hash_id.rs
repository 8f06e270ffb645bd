//! Medium post hash IDs
//!
//! Medium URLs and GUIDs end in a 12 character hex identifier
//! (`https://medium.com/p/cb4864b0cfc6`, `.../some-title-cb4864b0cfc6?source=rss`).
//! That identifier is the join key between the CSV and the JSON stores.

use std::sync::LazyLock;

use regex::Regex;

static HASH_IN_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9a-f]{12})(?:\?|$)").expect("valid hash regex"));

/// Extract the hash ID from a URL or GUID.
///
/// Returns the first run of 12 lowercase hex characters that is followed by
/// `?` or the end of the string.
pub fn extract_hash_id(s: &str) -> Option<String> {
    HASH_IN_URL
        .captures(s.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether `s` is exactly a 12 character lowercase hex string.
pub fn is_hash_id(s: &str) -> bool {
    s.len() == 12 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
