//! Tree acquisition: fetch the service's pre-built file mapping.

use tracing::info;

use crate::archive::normalize_entry_path;
use crate::client::{ClientError, ShelvClient, TreeResponse};
use crate::error::{AdapterError, AdapterResult};
use crate::types::{ShelfFiles, ShelfSource, TreeSource};

/// Fetch and validate the tree of `shelf_id`.
pub(crate) async fn resolve_from_tree<C: ShelvClient + ?Sized>(
    client: &C,
    shelf_id: &str,
) -> AdapterResult<ShelfSource> {
    let tree_failed = |source| AdapterError::TreeFetchFailed {
        shelf_id: shelf_id.to_string(),
        source,
    };

    let tree = client.fetch_tree(shelf_id).await.map_err(tree_failed)?;
    let source = validate_tree(tree).map_err(tree_failed)?;

    info!(shelf_id, files = source.files.len(), "resolved shelf from tree");
    Ok(ShelfSource::Tree(source))
}

/// Check the declared count and normalize every path key.
fn validate_tree(tree: TreeResponse) -> Result<TreeSource, ClientError> {
    if tree.file_count != tree.files.len() {
        return Err(ClientError::InvalidResponse(format!(
            "tree declares {} files but contains {}",
            tree.file_count,
            tree.files.len()
        )));
    }

    let mut files = ShelfFiles::new();
    for (raw, text) in tree.files {
        let path = normalize_entry_path(&raw)
            .map_err(|e| ClientError::InvalidResponse(format!("tree entry rejected: {}", e)))?;
        if files.insert(path, text).is_some() {
            return Err(ClientError::InvalidResponse(format!(
                "tree entry {:?} duplicates another path",
                raw
            )));
        }
    }

    Ok(TreeSource {
        file_count: files.len(),
        files,
        shelf_name: tree.name,
        shelf_public_id: tree.shelf_public_id,
    })
}
