//! Shelf source data model.
//!
//! A resolution produces exactly one [`ShelfSource`], tagged by where its files
//! came from. All values here are built fresh per resolution and never mutated
//! afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Relative path → text content.
///
/// Ordered by path so enumeration (and therefore sandbox write order) is
/// deterministic.
pub type ShelfFiles = BTreeMap<String, String>;

/// Where a resolved shelf came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Archive,
    Tree,
    /// Paths only; contents are fetched on demand.
    Listing,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Archive => "archive",
            SourceKind::Tree => "tree",
            SourceKind::Listing => "listing",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files resolved from a verified archive download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSource {
    pub files: ShelfFiles,
    /// Digest asserted by the service (verified against the downloaded bytes).
    pub archive_sha256: String,
    pub archive_version: String,
    /// Expiry of the download URL, as sent by the service.
    pub archive_expires_at: String,
    pub archive_size_bytes: u64,
    pub archive_url: String,
}

impl ArchiveSource {
    /// Parse the URL expiry as an RFC 3339 timestamp.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.archive_expires_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whether the download URL has expired at `now`.
    ///
    /// Unparseable expiries are treated as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at_utc().map_or(true, |expiry| expiry <= now)
    }
}

/// Files resolved from the service's pre-built tree endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSource {
    pub files: ShelfFiles,
    pub file_count: usize,
    pub shelf_name: String,
    pub shelf_public_id: String,
}

/// A resolved shelf.
///
/// Serializes with a `kind` tag of `"archive"` or `"tree"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShelfSource {
    Archive(ArchiveSource),
    Tree(TreeSource),
}

impl ShelfSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ShelfSource::Archive(_) => SourceKind::Archive,
            ShelfSource::Tree(_) => SourceKind::Tree,
        }
    }

    pub fn files(&self) -> &ShelfFiles {
        match self {
            ShelfSource::Archive(source) => &source.files,
            ShelfSource::Tree(source) => &source.files,
        }
    }

    pub fn into_files(self) -> ShelfFiles {
        match self {
            ShelfSource::Archive(source) => source.files,
            ShelfSource::Tree(source) => source.files,
        }
    }

    /// Number of files in the mapping.
    pub fn file_count(&self) -> usize {
        self.files().len()
    }

    /// Iterate `(path, content)` pairs in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files()
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
    }
}

/// How the resolver chooses between the archive and tree paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShelfSourceMode {
    /// Try the archive; on any archive failure fall back to the tree.
    #[default]
    ArchiveFirst,
    /// Only fetch the tree.
    TreeOnly,
    /// Only download the archive.
    ArchiveOnly,
}

impl ShelfSourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfSourceMode::ArchiveFirst => "archive-first",
            ShelfSourceMode::TreeOnly => "tree-only",
            ShelfSourceMode::ArchiveOnly => "archive-only",
        }
    }
}

impl fmt::Display for ShelfSourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShelfSourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "archive-first" => Ok(ShelfSourceMode::ArchiveFirst),
            "tree-only" => Ok(ShelfSourceMode::TreeOnly),
            "archive-only" => Ok(ShelfSourceMode::ArchiveOnly),
            other => Err(format!(
                "unknown source mode '{}' (expected archive-first, tree-only or archive-only)",
                other
            )),
        }
    }
}

/// A request to resolve one shelf.
///
/// Overrides left unset fall back to the client's [`ArchiveDefaults`].
///
/// [`ArchiveDefaults`]: crate::config::ArchiveDefaults
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Opaque shelf identifier (e.g. `shf_...`).
    pub shelf_public_id: String,
    pub mode: ShelfSourceMode,
    pub archive_ttl_secs: Option<u64>,
    pub poll_interval: Option<Duration>,
    pub max_poll_attempts: Option<u32>,
    /// Checked before every poll sleep.
    pub cancellation: Option<CancellationToken>,
}

impl ResolveRequest {
    /// Create a request for `shelf_public_id` using the default mode.
    pub fn new(shelf_public_id: impl Into<String>) -> Self {
        Self {
            shelf_public_id: shelf_public_id.into(),
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ShelfSourceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_archive_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.archive_ttl_secs = Some(ttl_secs);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = Some(attempts);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
