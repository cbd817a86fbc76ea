//! In-memory extraction of shelf archives.
//!
//! The archive is gunzipped in full, then walked entry by entry. Only regular
//! files are kept; every kept path must pass [`normalize_entry_path`]. A single
//! rejected path fails the whole extraction so a poisoned archive is never
//! partially trusted.

use std::io::Read;

use flate2::read::MultiGzDecoder;
use tracing::{debug, warn};

use super::error::ArchiveParseError;
use crate::types::ShelfFiles;

/// Validate and normalize a raw archive entry path.
///
/// Rules, in order:
/// 1. Empty paths and paths containing NUL or `\` are invalid.
/// 2. A single leading `./` is stripped.
/// 3. The remainder must be non-empty, must not start with `/`, and no
///    `/`-delimited segment may be empty or `..`.
///
/// # Returns
///
/// The normalized relative path.
pub fn normalize_entry_path(raw: &str) -> Result<String, ArchiveParseError> {
    if raw.is_empty() || raw.contains('\0') || raw.contains('\\') {
        return Err(ArchiveParseError::InvalidPath {
            path: raw.to_string(),
        });
    }

    let normalized = raw.strip_prefix("./").unwrap_or(raw);

    if normalized.is_empty()
        || normalized.starts_with('/')
        || normalized
            .split('/')
            .any(|segment| segment.is_empty() || segment == "..")
    {
        return Err(ArchiveParseError::UnsafePath {
            path: raw.to_string(),
        });
    }

    Ok(normalized.to_string())
}

/// Extract the text files of a tar.gz archive into a path → text mapping.
///
/// Directories, links and other special entries are skipped. Members whose
/// contents are not valid UTF-8 are excluded from the mapping. If the archive
/// lists the same path twice, the later entry wins.
///
/// # Errors
///
/// Returns [`ArchiveParseError::Gzip`] or [`ArchiveParseError::Tar`] for
/// corrupt input, and [`ArchiveParseError::InvalidPath`] or
/// [`ArchiveParseError::UnsafePath`] if any regular file has an unsafe path.
pub fn extract_text_files(archive_bytes: &[u8]) -> Result<ShelfFiles, ArchiveParseError> {
    let tar_bytes = gunzip(archive_bytes)?;

    let mut archive = tar::Archive::new(tar_bytes.as_slice());
    let entries = archive.entries().map_err(ArchiveParseError::Tar)?;

    let mut files = ShelfFiles::new();
    let mut skipped = 0usize;

    for entry in entries {
        let mut entry = entry.map_err(ArchiveParseError::Tar)?;

        let entry_type = entry.header().entry_type();
        if !entry_type.is_file() {
            skipped += 1;
            continue;
        }

        let raw_path = entry.path_bytes().into_owned();
        let raw_path = String::from_utf8(raw_path).map_err(|e| ArchiveParseError::InvalidPath {
            path: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })?;
        let path = normalize_entry_path(&raw_path)?;

        let mut body = Vec::new();
        entry
            .read_to_end(&mut body)
            .map_err(ArchiveParseError::Tar)?;

        match String::from_utf8(body) {
            Ok(text) => {
                if files.insert(path.clone(), text).is_some() {
                    warn!(path = %path, "archive lists path more than once, keeping last entry");
                }
            }
            Err(_) => {
                warn!(path = %path, "skipping archive member that is not valid UTF-8");
            }
        }
    }

    debug!(
        files = files.len(),
        skipped,
        compressed_bytes = archive_bytes.len(),
        "extracted archive"
    );

    Ok(files)
}

/// Decompress a (possibly multi-member) gzip stream.
fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, ArchiveParseError> {
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(ArchiveParseError::Gzip)?;
    Ok(out)
}
