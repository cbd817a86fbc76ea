//! SHA-256 checksum calculation for archive verification.

use sha2::{Digest, Sha256};

use super::error::ChecksumMismatch;

/// Calculate the SHA-256 checksum of a byte buffer.
///
/// # Returns
///
/// The lowercase hexadecimal SHA-256 hash of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Verify that a byte buffer matches an expected checksum.
///
/// The comparison ignores ASCII case, so digests asserted in upper-case hex
/// are accepted.
///
/// # Returns
///
/// `Ok(())` if the checksum matches, or the expected and actual digests if it
/// doesn't.
pub fn verify_checksum(bytes: &[u8], expected: &str) -> Result<(), ChecksumMismatch> {
    let actual = sha256_hex(bytes);
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
