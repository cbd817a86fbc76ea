//! Sandbox hydration.
//!
//! A [`SandboxTarget`] receives the resolved file mapping. [`hydrate`] runs a
//! resolution and hands the files to the target in path order; [`snapshot`]
//! asks a target to capture its current state, which only some targets
//! support.

mod directory;

use serde::Serialize;
use tracing::info;

use crate::client::{BoxFuture, ShelvClient};
use crate::error::{AdapterError, AdapterResult};
use crate::resolver::ShelfResolver;
use crate::types::{ResolveRequest, ShelfFiles, SourceKind};

pub use directory::DirectoryTarget;

/// A destination for resolved shelf files.
pub trait SandboxTarget: Send + Sync {
    /// Short identifier used in results and error messages.
    fn name(&self) -> &str;

    /// Persist every file. `files` iterates in path order.
    fn write_files<'a>(&'a self, files: &'a ShelfFiles) -> BoxFuture<'a, AdapterResult<()>>;

    /// Capture the target's state and return a snapshot id.
    ///
    /// Targets without snapshot support keep the default, which fails with
    /// `UNSUPPORTED_CLIENT`.
    fn snapshot<'a>(&'a self, _label: Option<&'a str>) -> BoxFuture<'a, AdapterResult<String>> {
        let err = AdapterError::UnsupportedClient(format!(
            "{} target does not support snapshots",
            self.name()
        ));
        Box::pin(async move { Err(err) })
    }
}

/// Outcome of [`hydrate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateResult {
    pub target: String,
    pub source_kind: SourceKind,
    pub file_count: usize,
}

/// Outcome of [`snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResult {
    pub target: String,
    pub snapshot_id: String,
}

/// Resolve `request` and write the files into `target`.
pub async fn hydrate<C, T>(
    resolver: &ShelfResolver<C>,
    target: &T,
    request: &ResolveRequest,
) -> AdapterResult<HydrateResult>
where
    C: ShelvClient,
    T: SandboxTarget + ?Sized,
{
    let source = resolver.resolve(request).await?;
    target.write_files(source.files()).await?;

    let result = HydrateResult {
        target: target.name().to_string(),
        source_kind: source.kind(),
        file_count: source.file_count(),
    };
    info!(
        shelf_id = %request.shelf_public_id,
        target = %result.target,
        source = %result.source_kind,
        files = result.file_count,
        "hydrated sandbox"
    );
    Ok(result)
}

/// Ask `target` for a snapshot.
pub async fn snapshot<T: SandboxTarget + ?Sized>(
    target: &T,
    label: Option<&str>,
) -> AdapterResult<SnapshotResult> {
    let snapshot_id = target.snapshot(label).await?;
    Ok(SnapshotResult {
        target: target.name().to_string(),
        snapshot_id,
    })
}
