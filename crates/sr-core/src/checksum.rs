//! SHA-256 hashing for call-site identity.

use sha2::{Digest, Sha256};

/// Number of SQL characters that take part in a call id.
pub const CALL_ID_SQL_PREFIX: usize = 100;

/// Number of hex characters kept from the digest.
pub const CALL_ID_LEN: usize = 12;

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Stable identity of a call site.
///
/// Only the file path, the line number and the first 100 characters of the
/// SQL text participate, so edits further into a long query keep the id.
pub fn call_id(file_path: &str, line_number: usize, sql: &str) -> String {
    let prefix: String = sql.chars().take(CALL_ID_SQL_PREFIX).collect();
    let mut digest = compute_checksum(&format!("{file_path}:{line_number}:{prefix}"));
    digest.truncate(CALL_ID_LEN);
    digest
}
