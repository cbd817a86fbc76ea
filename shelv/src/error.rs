//! Error taxonomy shared by the resolver and sandbox targets.
//!
//! Every failure that leaves the crate is an [`AdapterError`]. Each variant maps
//! to a stable [`ErrorCode`] so callers can branch on the kind of failure without
//! matching on message text. Lower-level failures (HTTP transport, archive
//! decoding) stay attached as the error source.

use std::fmt;

use thiserror::Error;

use crate::archive::ArchiveParseError;
use crate::client::ClientError;

/// Result type for resolver and sandbox operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Boxed error used where the underlying failure type is owned by a collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable, machine-readable error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ArchiveTimeout,
    ArchiveDownloadFailed,
    ArchiveChecksumMismatch,
    ArchiveParseFailed,
    TreeFetchFailed,
    UnsupportedClient,
    WriteFailed,
    Cancelled,
    InvalidRequest,
}

impl ErrorCode {
    /// The wire/log representation of this code (e.g. `ARCHIVE_TIMEOUT`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ArchiveTimeout => "ARCHIVE_TIMEOUT",
            ErrorCode::ArchiveDownloadFailed => "ARCHIVE_DOWNLOAD_FAILED",
            ErrorCode::ArchiveChecksumMismatch => "ARCHIVE_CHECKSUM_MISMATCH",
            ErrorCode::ArchiveParseFailed => "ARCHIVE_PARSE_FAILED",
            ErrorCode::TreeFetchFailed => "TREE_FETCH_FAILED",
            ErrorCode::UnsupportedClient => "UNSUPPORTED_CLIENT",
            ErrorCode::WriteFailed => "WRITE_FAILED",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by shelf resolution and sandbox hydration.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The archive never left the `generating` state within the poll budget.
    #[error("archive URL did not become ready after {attempts} attempts")]
    ArchiveTimeout { attempts: u32 },

    /// Asking the service for archive readiness failed.
    #[error("archive readiness request failed for {shelf_id}: {source}")]
    ArchiveUnavailable {
        shelf_id: String,
        #[source]
        source: ClientError,
    },

    /// Downloading the archive bytes failed.
    #[error("archive download failed for {url}: {source}")]
    ArchiveDownloadFailed {
        url: String,
        #[source]
        source: ClientError,
    },

    /// Downloaded bytes do not hash to the digest the service asserted.
    #[error("archive checksum mismatch for {shelf_id}: expected {expected}, got {actual}")]
    ArchiveChecksumMismatch {
        shelf_id: String,
        expected: String,
        actual: String,
    },

    /// The archive could not be decoded or contained an unsafe entry.
    #[error("failed to parse archive: {0}")]
    ArchiveParseFailed(#[from] ArchiveParseError),

    /// Fetching the pre-built file tree failed.
    #[error("failed to fetch shelf tree for {shelf_id}: {source}")]
    TreeFetchFailed {
        shelf_id: String,
        #[source]
        source: ClientError,
    },

    /// Fetching a single listed file failed.
    #[error("failed to fetch {path} from {shelf_id}: {source}")]
    FileFetchFailed {
        shelf_id: String,
        path: String,
        #[source]
        source: ClientError,
    },

    /// A sandbox target lacks a capability the caller asked for.
    #[error("unsupported sandbox client: {0}")]
    UnsupportedClient(String),

    /// A sandbox target failed to persist a file.
    #[error("{target} failed to write {path}: {source}")]
    WriteFailed {
        target: String,
        path: String,
        #[source]
        source: BoxError,
    },

    /// The caller cancelled the resolution.
    #[error("resolution of {shelf_id} was cancelled")]
    Cancelled { shelf_id: String },

    /// The resolve request carried invalid settings.
    #[error("invalid resolve request: {0}")]
    InvalidRequest(String),
}

impl AdapterError {
    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AdapterError::ArchiveTimeout { .. } => ErrorCode::ArchiveTimeout,
            AdapterError::ArchiveUnavailable { .. } | AdapterError::ArchiveDownloadFailed { .. } => {
                ErrorCode::ArchiveDownloadFailed
            }
            AdapterError::ArchiveChecksumMismatch { .. } => ErrorCode::ArchiveChecksumMismatch,
            AdapterError::ArchiveParseFailed(_) => ErrorCode::ArchiveParseFailed,
            AdapterError::TreeFetchFailed { .. } | AdapterError::FileFetchFailed { .. } => {
                ErrorCode::TreeFetchFailed
            }
            AdapterError::UnsupportedClient(_) => ErrorCode::UnsupportedClient,
            AdapterError::WriteFailed { .. } => ErrorCode::WriteFailed,
            AdapterError::Cancelled { .. } => ErrorCode::Cancelled,
            AdapterError::InvalidRequest(_) => ErrorCode::InvalidRequest,
        }
    }

    /// Whether this failure came from the archive path and may be recovered
    /// by falling back to the tree path.
    pub fn is_archive_failure(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::ArchiveTimeout
                | ErrorCode::ArchiveDownloadFailed
                | ErrorCode::ArchiveChecksumMismatch
                | ErrorCode::ArchiveParseFailed
        )
    }

    /// HTTP status attached to a download or fetch failure, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AdapterError::ArchiveUnavailable { source, .. }
            | AdapterError::ArchiveDownloadFailed { source, .. }
            | AdapterError::TreeFetchFailed { source, .. }
            | AdapterError::FileFetchFailed { source, .. } => source.status(),
            _ => None,
        }
    }
}
