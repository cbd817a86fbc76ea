//! Wire shapes returned by the Shelv API.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A ready-to-download archive.
///
/// Wire shape: `{"url","expiresAt","sha256","sizeBytes","version"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveUrlReady {
    pub url: String,
    pub expires_at: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub version: String,
}

/// Result of a single archive readiness check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ReadinessWire")]
pub enum ArchiveReadiness {
    /// The archive can be downloaded now.
    Ready(ArchiveUrlReady),
    /// The archive is still being built; ask again after `retry_after_secs`.
    Generating { retry_after_secs: f64 },
}

impl ArchiveReadiness {
    /// Convenience constructor for a `generating` response.
    pub fn generating(retry_after_secs: f64) -> Self {
        ArchiveReadiness::Generating { retry_after_secs }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ArchiveReadiness::Ready(_))
    }
}

/// Convert a service `retryAfter` hint into a delay.
///
/// Negative, NaN and infinite hints count as "no hint".
pub fn retry_after_delay(retry_after_secs: f64) -> Duration {
    if !retry_after_secs.is_finite() || retry_after_secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(retry_after_secs).unwrap_or(Duration::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GeneratingStatus {
    Generating,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratingWire {
    #[allow(dead_code)]
    status: GeneratingStatus,
    retry_after: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReadinessWire {
    Generating(GeneratingWire),
    Ready(ArchiveUrlReady),
}

impl From<ReadinessWire> for ArchiveReadiness {
    fn from(wire: ReadinessWire) -> Self {
        match wire {
            ReadinessWire::Generating(g) => ArchiveReadiness::Generating {
                retry_after_secs: g.retry_after,
            },
            ReadinessWire::Ready(ready) => ArchiveReadiness::Ready(ready),
        }
    }
}

/// A pre-built file tree.
///
/// Wire shape: `{"shelfPublicId","name","fileCount","files":{path:text}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResponse {
    pub shelf_public_id: String,
    pub name: String,
    pub file_count: usize,
    pub files: BTreeMap<String, String>,
}

/// Paths of a shelf without their contents.
///
/// Wire shape: `{"shelfPublicId","name","fileCount","paths":[path]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub shelf_public_id: String,
    pub name: String,
    pub file_count: usize,
    pub paths: Vec<String>,
}
