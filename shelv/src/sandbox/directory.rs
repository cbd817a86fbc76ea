//! Local directory sandbox target.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::SandboxTarget;
use crate::archive::normalize_entry_path;
use crate::client::BoxFuture;
use crate::error::{AdapterError, AdapterResult, BoxError};
use crate::types::ShelfFiles;

const TARGET_NAME: &str = "directory";

/// Writes shelf files beneath a root directory.
///
/// Parent directories are created as needed and existing files are
/// overwritten. Paths are re-validated before writing so a mapping built by
/// hand cannot escape the root.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    root: PathBuf,
}

impl DirectoryTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_failed(
        path: &str,
        source: impl Into<BoxError>,
    ) -> AdapterError {
        AdapterError::WriteFailed {
            target: TARGET_NAME.to_string(),
            path: path.to_string(),
            source: source.into(),
        }
    }

    async fn write_one(&self, path: &str, content: &str) -> AdapterResult<()> {
        let relative = normalize_entry_path(path).map_err(|e| Self::write_failed(path, e))?;
        let full = self.root.join(&relative);

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::write_failed(path, e))?;
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| Self::write_failed(path, e))?;

        debug!(path = %full.display(), bytes = content.len(), "wrote shelf file");
        Ok(())
    }
}

impl SandboxTarget for DirectoryTarget {
    fn name(&self) -> &str {
        TARGET_NAME
    }

    fn write_files<'a>(&'a self, files: &'a ShelfFiles) -> BoxFuture<'a, AdapterResult<()>> {
        Box::pin(async move {
            for (path, content) in files {
                self.write_one(path, content).await?;
            }
            Ok(())
        })
    }
}
