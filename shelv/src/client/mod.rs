//! Shelv remote client contract.
//!
//! The resolver only depends on the [`ShelvClient`] trait. [`HttpShelvClient`]
//! is the production implementation backed by `reqwest`; tests substitute
//! scripted clients.
//!
//! # Dyn Compatibility
//!
//! Async methods return [`BoxFuture`] so the trait can be used as
//! `Arc<dyn ShelvClient>` and so every returned future is `Send`.

mod error;
mod http;
mod types;

#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use crate::config::ArchiveDefaults;

pub use error::ClientError;
pub use http::HttpShelvClient;
pub use types::{
    retry_after_delay, ArchiveReadiness, ArchiveUrlReady, ListingResponse, TreeResponse,
};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Operations the resolver needs from the Shelv service.
pub trait ShelvClient: Send + Sync {
    /// Check once whether the shelf archive is ready to download.
    ///
    /// The caller owns the retry loop; implementations must not poll.
    fn archive_readiness<'a>(
        &'a self,
        shelf_public_id: &'a str,
        ttl_secs: u64,
    ) -> BoxFuture<'a, Result<ArchiveReadiness, ClientError>>;

    /// Download raw archive bytes from a URL returned by
    /// [`archive_readiness`](ShelvClient::archive_readiness).
    fn download_archive<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, ClientError>>;

    /// Fetch the pre-built file tree of a shelf.
    fn fetch_tree<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<TreeResponse, ClientError>>;

    /// List the paths of a shelf without fetching their contents.
    fn list_files<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<ListingResponse, ClientError>>;

    /// Fetch the text of a single file.
    fn fetch_file<'a>(
        &'a self,
        shelf_public_id: &'a str,
        path: &'a str,
    ) -> BoxFuture<'a, Result<String, ClientError>>;

    /// Polling defaults used when a resolve request leaves them unset.
    fn archive_defaults(&self) -> ArchiveDefaults {
        ArchiveDefaults::default()
    }
}

impl<C: ShelvClient + ?Sized> ShelvClient for Arc<C> {
    fn archive_readiness<'a>(
        &'a self,
        shelf_public_id: &'a str,
        ttl_secs: u64,
    ) -> BoxFuture<'a, Result<ArchiveReadiness, ClientError>> {
        (**self).archive_readiness(shelf_public_id, ttl_secs)
    }

    fn download_archive<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, ClientError>> {
        (**self).download_archive(url)
    }

    fn fetch_tree<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<TreeResponse, ClientError>> {
        (**self).fetch_tree(shelf_public_id)
    }

    fn list_files<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<ListingResponse, ClientError>> {
        (**self).list_files(shelf_public_id)
    }

    fn fetch_file<'a>(
        &'a self,
        shelf_public_id: &'a str,
        path: &'a str,
    ) -> BoxFuture<'a, Result<String, ClientError>> {
        (**self).fetch_file(shelf_public_id, path)
    }

    fn archive_defaults(&self) -> ArchiveDefaults {
        (**self).archive_defaults()
    }
}

impl<C: ShelvClient + ?Sized> ShelvClient for &C {
    fn archive_readiness<'a>(
        &'a self,
        shelf_public_id: &'a str,
        ttl_secs: u64,
    ) -> BoxFuture<'a, Result<ArchiveReadiness, ClientError>> {
        (**self).archive_readiness(shelf_public_id, ttl_secs)
    }

    fn download_archive<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, ClientError>> {
        (**self).download_archive(url)
    }

    fn fetch_tree<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<TreeResponse, ClientError>> {
        (**self).fetch_tree(shelf_public_id)
    }

    fn list_files<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<ListingResponse, ClientError>> {
        (**self).list_files(shelf_public_id)
    }

    fn fetch_file<'a>(
        &'a self,
        shelf_public_id: &'a str,
        path: &'a str,
    ) -> BoxFuture<'a, Result<String, ClientError>> {
        (**self).fetch_file(shelf_public_id, path)
    }

    fn archive_defaults(&self) -> ArchiveDefaults {
        (**self).archive_defaults()
    }
}
