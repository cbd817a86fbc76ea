//! Lazy shelf access: list the paths now, fetch contents on demand.

use std::fmt;

use tracing::{debug, info};

use crate::archive::normalize_entry_path;
use crate::client::{ClientError, ListingResponse, ShelvClient};
use crate::error::{AdapterError, AdapterResult};
use crate::types::{ShelfFiles, SourceKind};

/// A listed shelf whose file contents are loaded one at a time.
///
/// Holds the client so each [`load`](LazyShelf::load) issues a single
/// `fetch_file` request. Only listed paths can be loaded.
pub struct LazyShelf<C> {
    client: C,
    shelf_public_id: String,
    name: String,
    /// Normalized and sorted.
    paths: Vec<String>,
}

impl<C> fmt::Debug for LazyShelf<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyShelf")
            .field("shelf_public_id", &self.shelf_public_id)
            .field("name", &self.name)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl<C: ShelvClient> LazyShelf<C> {
    pub fn shelf_public_id(&self) -> &str {
        &self.shelf_public_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Listed paths in sorted order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn file_count(&self) -> usize {
        self.paths.len()
    }

    /// Always [`SourceKind::Listing`].
    pub fn source_kind(&self) -> SourceKind {
        SourceKind::Listing
    }

    pub fn contains(&self, path: &str) -> bool {
        normalize_entry_path(path)
            .map(|path| self.paths.binary_search(&path).is_ok())
            .unwrap_or(false)
    }

    /// Fetch the text of one listed file.
    pub async fn load(&self, path: &str) -> AdapterResult<String> {
        let normalized = normalize_entry_path(path)
            .map_err(|e| AdapterError::InvalidRequest(format!("cannot load {:?}: {}", path, e)))?;
        if self.paths.binary_search(&normalized).is_err() {
            return Err(AdapterError::InvalidRequest(format!(
                "{:?} is not listed in shelf {}",
                normalized, self.shelf_public_id
            )));
        }

        let text = self
            .client
            .fetch_file(&self.shelf_public_id, &normalized)
            .await
            .map_err(|source| AdapterError::FileFetchFailed {
                shelf_id: self.shelf_public_id.clone(),
                path: normalized.clone(),
                source,
            })?;

        debug!(
            shelf_id = %self.shelf_public_id,
            path = %normalized,
            bytes = text.len(),
            "loaded listed file"
        );
        Ok(text)
    }

    /// Fetch every listed file, in path order.
    pub async fn load_all(&self) -> AdapterResult<ShelfFiles> {
        let mut files = ShelfFiles::new();
        for path in &self.paths {
            let text = self.load(path).await?;
            files.insert(path.clone(), text);
        }
        Ok(files)
    }
}

/// List `shelf_id` through `client`.
pub(crate) async fn list_from<C: ShelvClient>(
    client: C,
    shelf_id: &str,
) -> AdapterResult<LazyShelf<C>> {
    let list_failed = |source| AdapterError::TreeFetchFailed {
        shelf_id: shelf_id.to_string(),
        source,
    };

    let listing = client.list_files(shelf_id).await.map_err(list_failed)?;
    let (name, paths) = validate_listing(listing).map_err(list_failed)?;

    info!(shelf_id, files = paths.len(), "listed shelf");
    Ok(LazyShelf {
        client,
        shelf_public_id: shelf_id.to_string(),
        name,
        paths,
    })
}

fn validate_listing(listing: ListingResponse) -> Result<(String, Vec<String>), ClientError> {
    if listing.file_count != listing.paths.len() {
        return Err(ClientError::InvalidResponse(format!(
            "listing declares {} files but contains {}",
            listing.file_count,
            listing.paths.len()
        )));
    }

    let mut paths = listing
        .paths
        .iter()
        .map(|raw| {
            normalize_entry_path(raw)
                .map_err(|e| ClientError::InvalidResponse(format!("listing entry rejected: {}", e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();

    if let Some(pair) = paths.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(ClientError::InvalidResponse(format!(
            "listing names {:?} more than once",
            pair[0]
        )));
    }

    Ok((listing.name, paths))
}
