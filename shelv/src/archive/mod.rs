//! Archive codec for shelf archives.
//!
//! Shelf archives are gzip-compressed tar streams of UTF-8 text files. This
//! module provides:
//! - SHA-256 digests of raw archive bytes (`checksum`)
//! - In-memory extraction into a path → text mapping with path-safety
//!   validation (`extractor`)
//!
//! Everything here is a pure transform over byte buffers: no I/O, no shared
//! state, safe to call concurrently for independent inputs.

mod checksum;
mod error;
mod extractor;

#[cfg(test)]
pub(crate) mod testing;

pub use checksum::{sha256_hex, verify_checksum};
pub use error::{ArchiveParseError, ChecksumMismatch};
pub use extractor::{extract_text_files, normalize_entry_path};
