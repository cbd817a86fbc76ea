//! Archive acquisition: poll for a ready URL, download, verify, extract.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::archive::{extract_text_files, verify_checksum};
use crate::client::{retry_after_delay, ArchiveReadiness, ArchiveUrlReady, ShelvClient};
use crate::config::ArchiveDefaults;
use crate::error::{AdapterError, AdapterResult};
use crate::types::{ArchiveSource, ResolveRequest, ShelfSource};

/// Effective polling settings for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollSettings {
    pub ttl_secs: u64,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    /// Merge request overrides over client defaults and reject zero values.
    pub fn from_request(request: &ResolveRequest, defaults: ArchiveDefaults) -> AdapterResult<Self> {
        let settings = Self {
            ttl_secs: request.archive_ttl_secs.unwrap_or(defaults.ttl_secs),
            interval: request.poll_interval.unwrap_or(defaults.poll_interval),
            max_attempts: request.max_poll_attempts.unwrap_or(defaults.max_poll_attempts),
        };

        if settings.ttl_secs == 0 {
            return Err(AdapterError::InvalidRequest(
                "archive TTL must be at least one second".to_string(),
            ));
        }
        if settings.interval.is_zero() {
            return Err(AdapterError::InvalidRequest(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if settings.max_attempts == 0 {
            return Err(AdapterError::InvalidRequest(
                "max poll attempts must be at least one".to_string(),
            ));
        }

        Ok(settings)
    }
}

/// Poll until the service reports a ready archive URL.
///
/// The first check happens immediately. Between checks the loop sleeps for the
/// larger of the service's `retryAfter` hint and the configured interval.
pub(crate) async fn wait_for_archive_url<C: ShelvClient + ?Sized>(
    client: &C,
    shelf_id: &str,
    settings: PollSettings,
    cancellation: Option<&CancellationToken>,
) -> AdapterResult<ArchiveUrlReady> {
    for attempt in 1..=settings.max_attempts {
        let readiness = client
            .archive_readiness(shelf_id, settings.ttl_secs)
            .await
            .map_err(|source| AdapterError::ArchiveUnavailable {
                shelf_id: shelf_id.to_string(),
                source,
            })?;

        let retry_after_secs = match readiness {
            ArchiveReadiness::Ready(ready) => {
                debug!(shelf_id, attempt, version = %ready.version, "archive ready");
                return Ok(ready);
            }
            ArchiveReadiness::Generating { retry_after_secs } => retry_after_secs,
        };

        if attempt == settings.max_attempts {
            break;
        }

        let delay = retry_after_delay(retry_after_secs).max(settings.interval);
        debug!(
            shelf_id,
            attempt,
            max_attempts = settings.max_attempts,
            delay_ms = delay.as_millis() as u64,
            "archive still generating"
        );
        sleep_or_cancel(delay, cancellation, shelf_id).await?;
    }

    Err(AdapterError::ArchiveTimeout {
        attempts: settings.max_attempts,
    })
}

async fn sleep_or_cancel(
    delay: Duration,
    cancellation: Option<&CancellationToken>,
    shelf_id: &str,
) -> AdapterResult<()> {
    let cancelled = || AdapterError::Cancelled {
        shelf_id: shelf_id.to_string(),
    };

    match cancellation {
        None => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
        Some(token) => {
            if token.is_cancelled() {
                return Err(cancelled());
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(cancelled()),
                _ = tokio::time::sleep(delay) => Ok(()),
            }
        }
    }
}

/// Run the full archive flow for `request`.
pub(crate) async fn resolve_from_archive<C: ShelvClient + ?Sized>(
    client: &C,
    request: &ResolveRequest,
    settings: PollSettings,
) -> AdapterResult<ShelfSource> {
    let shelf_id = request.shelf_public_id.as_str();
    let ready =
        wait_for_archive_url(client, shelf_id, settings, request.cancellation.as_ref()).await?;

    let bytes = client
        .download_archive(&ready.url)
        .await
        .map_err(|source| AdapterError::ArchiveDownloadFailed {
            url: ready.url.clone(),
            source,
        })?;

    // Reject before decoding anything from an unverified stream.
    verify_checksum(&bytes, &ready.sha256).map_err(|mismatch| {
        AdapterError::ArchiveChecksumMismatch {
            shelf_id: shelf_id.to_string(),
            expected: mismatch.expected,
            actual: mismatch.actual,
        }
    })?;

    let files = extract_text_files(&bytes)?;

    info!(
        shelf_id,
        files = files.len(),
        bytes = bytes.len(),
        version = %ready.version,
        "resolved shelf from archive"
    );

    Ok(ShelfSource::Archive(ArchiveSource {
        files,
        archive_sha256: ready.sha256,
        archive_version: ready.version,
        archive_expires_at: ready.expires_at,
        archive_size_bytes: ready.size_bytes,
        archive_url: ready.url,
    }))
}
