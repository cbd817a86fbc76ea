//! Shelf source resolution.
//!
//! [`ShelfResolver`] decides between the archive path (poll, download, verify,
//! extract) and the tree path according to [`ShelfSourceMode`]:
//!
//! | mode            | archive | tree                          |
//! |-----------------|---------|-------------------------------|
//! | `archive-first` | yes     | only after an archive failure |
//! | `archive-only`  | yes     | never                         |
//! | `tree-only`     | never   | yes                           |
//!
//! In `archive-first` mode the archive error is discarded from the result but
//! reported through a `warn` event and the optional [`FallbackObserver`].
//!
//! [`list_shelf`] is the lazy alternative: it lists paths only and returns a
//! [`LazyShelf`] that fetches each file on demand.

mod archive;
mod listing;
mod tree;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::ShelvClient;
use crate::error::{AdapterError, AdapterResult};
use crate::types::{ResolveRequest, ShelfSource, ShelfSourceMode};

use archive::{resolve_from_archive, PollSettings};
use listing::list_from;
use tree::resolve_from_tree;

pub use listing::LazyShelf;

/// Callback receiving `(shelf_public_id, archive_error)` when `archive-first`
/// falls back to the tree.
pub type FallbackObserver = Arc<dyn Fn(&str, &AdapterError) + Send + Sync>;

/// Resolves shelves through a [`ShelvClient`].
pub struct ShelfResolver<C> {
    client: C,
    fallback_observer: Option<FallbackObserver>,
}

impl<C: fmt::Debug> fmt::Debug for ShelfResolver<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShelfResolver")
            .field("client", &self.client)
            .field("fallback_observer", &self.fallback_observer.is_some())
            .finish()
    }
}

impl<C: ShelvClient> ShelfResolver<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            fallback_observer: None,
        }
    }

    /// Observe archive errors that were recovered by falling back to the tree.
    pub fn with_fallback_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&str, &AdapterError) + Send + Sync + 'static,
    {
        self.fallback_observer = Some(Arc::new(observer));
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Resolve one shelf into its file mapping.
    pub async fn resolve(&self, request: &ResolveRequest) -> AdapterResult<ShelfSource> {
        resolve_with(&self.client, request, self.fallback_observer.as_ref()).await
    }

    /// List a shelf without fetching contents. See [`list_shelf`].
    pub async fn list(&self, shelf_public_id: &str) -> AdapterResult<LazyShelf<&C>> {
        list_shelf(&self.client, shelf_public_id).await
    }
}

/// List the paths of a shelf and return a loader for their contents.
///
/// Listing or file request failures surface as `TREE_FETCH_FAILED`.
pub async fn list_shelf<C: ShelvClient>(
    client: C,
    shelf_public_id: &str,
) -> AdapterResult<LazyShelf<C>> {
    validate_shelf_id(shelf_public_id)?;
    list_from(client, shelf_public_id).await
}

/// Shelf ids are sent as one URL path segment, so dot segments are refused.
fn validate_shelf_id(shelf_id: &str) -> AdapterResult<()> {
    if shelf_id.trim().is_empty() {
        return Err(AdapterError::InvalidRequest(
            "shelf public id must not be empty".to_string(),
        ));
    }
    if matches!(shelf_id, "." | "..") {
        return Err(AdapterError::InvalidRequest(format!(
            "shelf public id {:?} is not a valid identifier",
            shelf_id
        )));
    }
    Ok(())
}

/// Resolve a shelf without constructing a [`ShelfResolver`].
pub async fn resolve_shelf_source<C: ShelvClient + ?Sized>(
    client: &C,
    request: &ResolveRequest,
) -> AdapterResult<ShelfSource> {
    resolve_with(client, request, None).await
}

async fn resolve_with<C: ShelvClient + ?Sized>(
    client: &C,
    request: &ResolveRequest,
    observer: Option<&FallbackObserver>,
) -> AdapterResult<ShelfSource> {
    let shelf_id = request.shelf_public_id.as_str();
    validate_shelf_id(shelf_id)?;
    if request
        .cancellation
        .as_ref()
        .is_some_and(|token| token.is_cancelled())
    {
        return Err(AdapterError::Cancelled {
            shelf_id: shelf_id.to_string(),
        });
    }

    debug!(shelf_id, mode = %request.mode, "resolving shelf");

    match request.mode {
        ShelfSourceMode::TreeOnly => resolve_from_tree(client, shelf_id).await,
        ShelfSourceMode::ArchiveOnly => {
            let settings = PollSettings::from_request(request, client.archive_defaults())?;
            resolve_from_archive(client, request, settings).await
        }
        ShelfSourceMode::ArchiveFirst => {
            let settings = PollSettings::from_request(request, client.archive_defaults())?;
            match resolve_from_archive(client, request, settings).await {
                Ok(source) => Ok(source),
                Err(err) if err.is_archive_failure() => {
                    warn!(
                        shelf_id,
                        code = %err.code(),
                        error = %err,
                        "archive path failed, falling back to tree"
                    );
                    if let Some(observer) = observer {
                        observer(shelf_id, &err);
                    }
                    resolve_from_tree(client, shelf_id).await
                }
                Err(err) => Err(err),
            }
        }
    }
}
