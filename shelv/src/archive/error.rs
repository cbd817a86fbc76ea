//! Error types for the archive codec.

use std::io;

use thiserror::Error;

/// Reasons an archive could not be turned into a file mapping.
///
/// All variants surface as `ARCHIVE_PARSE_FAILED`; the variant tells apart a
/// corrupt stream from an archive that was rejected for carrying an unsafe
/// entry.
#[derive(Debug, Error)]
pub enum ArchiveParseError {
    /// The gzip layer could not be decompressed.
    #[error("failed to gunzip archive: {0}")]
    Gzip(#[source] io::Error),

    /// The decompressed stream is not a well-formed tar archive.
    #[error("failed to extract archive: {0}")]
    Tar(#[source] io::Error),

    /// Entry path is empty, not UTF-8, or contains NUL or `\`.
    #[error("invalid archive path: {path:?}")]
    InvalidPath { path: String },

    /// Entry path is absolute, traverses upwards, or has empty segments.
    #[error("unsafe archive path: {path:?}")]
    UnsafePath { path: String },
}

/// Digest of downloaded bytes differs from the asserted digest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checksum mismatch: expected {expected}, got {actual}")]
pub struct ChecksumMismatch {
    pub expected: String,
    pub actual: String,
}
