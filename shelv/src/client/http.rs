//! HTTP implementation of the Shelv client.
//!
//! API requests go to `{api_base_url}/v1/shelves/{id}/...` with a bearer token.
//! Archive downloads hit the pre-signed URL returned by the service and carry
//! no credentials.

use bytes::Bytes;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ClientError;
use super::types::{ArchiveReadiness, ListingResponse, TreeResponse};
use super::{BoxFuture, ShelvClient};
use crate::config::{ArchiveDefaults, ShelvConfig};

/// Shelv API client backed by `reqwest`.
///
/// Cheap to share: the inner `reqwest::Client` pools connections, so wrap a
/// single instance in an `Arc` and reuse it across resolutions.
#[derive(Debug, Clone)]
pub struct HttpShelvClient {
    client: Client,
    config: ShelvConfig,
}

impl HttpShelvClient {
    /// Create a client from configuration.
    pub fn new(config: ShelvConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ShelvConfig {
        &self.config
    }

    /// Build `{base}/v1/shelves/{shelf_public_id}/{tail...}`.
    ///
    /// Every segment is percent-encoded on its own, so identifiers and file
    /// paths cannot inject extra path components. Empty, `.` and `..`
    /// segments are rejected: URL normalization would drop or collapse them
    /// and silently address a different route.
    fn shelf_url(&self, shelf_public_id: &str, tail: &[&str]) -> Result<Url, ClientError> {
        let base = &self.config.api_base_url;
        for segment in std::iter::once(&shelf_public_id).chain(tail) {
            if matches!(*segment, "" | "." | "..") {
                return Err(ClientError::InvalidUrl {
                    url: base.clone(),
                    reason: format!("path segment {:?} is not allowed", segment),
                });
            }
        }
        let mut url = Url::parse(base).map_err(|e| ClientError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl {
                url: base.clone(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["v1", "shelves", shelf_public_id])
            .extend(tail);

        Ok(url)
    }

    async fn get_api(&self, url: Url) -> Result<Response, ClientError> {
        let path = url.path().to_string();
        debug!(path = %path, "shelv API request");

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        ensure_success(response, path).await
    }

    async fn request_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let path = url.path().to_string();
        let response = self.get_api(url.clone()).await?;
        let body = response.bytes().await.map_err(|e| ClientError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode { path, source: e })
    }
}

/// Turn a non-success response into [`ClientError::Status`], keeping its body.
async fn ensure_success(response: Response, path: String) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        path,
        status: status.as_u16(),
        body,
    })
}

impl ShelvClient for HttpShelvClient {
    fn archive_readiness<'a>(
        &'a self,
        shelf_public_id: &'a str,
        ttl_secs: u64,
    ) -> BoxFuture<'a, Result<ArchiveReadiness, ClientError>> {
        Box::pin(async move {
            let mut url = self.shelf_url(shelf_public_id, &["archive-url"])?;
            url.query_pairs_mut()
                .append_pair("ttl", &ttl_secs.to_string());
            self.request_json(url).await
        })
    }

    fn download_archive<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, ClientError>> {
        Box::pin(async move {
            debug!(url = %url, "downloading archive");

            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| ClientError::Transport {
                    url: url.to_string(),
                    source: e,
                })?;
            let response = ensure_success(response, url.to_string()).await?;

            response.bytes().await.map_err(|e| ClientError::Transport {
                url: url.to_string(),
                source: e,
            })
        })
    }

    fn fetch_tree<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<TreeResponse, ClientError>> {
        Box::pin(async move {
            let url = self.shelf_url(shelf_public_id, &["tree"])?;
            self.request_json(url).await
        })
    }

    fn list_files<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<ListingResponse, ClientError>> {
        Box::pin(async move {
            let url = self.shelf_url(shelf_public_id, &["files"])?;
            self.request_json(url).await
        })
    }

    fn fetch_file<'a>(
        &'a self,
        shelf_public_id: &'a str,
        path: &'a str,
    ) -> BoxFuture<'a, Result<String, ClientError>> {
        Box::pin(async move {
            let mut tail = vec!["files"];
            tail.extend(path.split('/'));
            let url = self.shelf_url(shelf_public_id, &tail)?;

            let response = self.get_api(url.clone()).await?;
            response.text().await.map_err(|e| ClientError::Transport {
                url: url.to_string(),
                source: e,
            })
        })
    }

    fn archive_defaults(&self) -> ArchiveDefaults {
        self.config.archive
    }
}
