//! Scripted in-memory client for resolver and sandbox tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use bytes::Bytes;

use super::{
    ArchiveReadiness, ArchiveUrlReady, BoxFuture, ClientError, ListingResponse, ShelvClient,
    TreeResponse,
};
use crate::archive::sha256_hex;
use crate::config::ArchiveDefaults;

/// Scripted outcome; errors are rebuilt on every call as `ClientError::Status`.
type Scripted<T> = Result<T, (u16, String)>;

fn status_error<T>(path: &str, scripted: Scripted<T>) -> Result<T, ClientError> {
    scripted.map_err(|(status, body)| ClientError::Status {
        path: path.to_string(),
        status,
        body,
    })
}

/// Build a ready response whose digest matches `bytes`.
pub(crate) fn ready_for(url: &str, bytes: &[u8]) -> ArchiveUrlReady {
    ArchiveUrlReady {
        url: url.to_string(),
        expires_at: "2026-01-01T00:10:00.000Z".to_string(),
        sha256: sha256_hex(bytes),
        size_bytes: bytes.len() as u64,
        version: "2026-01-01T00:00:00.000Z".to_string(),
    }
}

pub(crate) fn tree(shelf_public_id: &str, files: &[(&str, &str)]) -> TreeResponse {
    TreeResponse {
        shelf_public_id: shelf_public_id.to_string(),
        name: "Docs".to_string(),
        file_count: files.len(),
        files: files
            .iter()
            .map(|(path, text)| (path.to_string(), text.to_string()))
            .collect(),
    }
}

pub(crate) struct MockShelvClient {
    /// Once exhausted, every check answers `generating`.
    readiness: Mutex<VecDeque<Scripted<ArchiveReadiness>>>,
    download: Scripted<Vec<u8>>,
    tree: Scripted<TreeResponse>,
    /// Served by `fetch_file`; also the default listing.
    files: BTreeMap<String, String>,
    listing: Option<Scripted<ListingResponse>>,
    defaults: ArchiveDefaults,

    pub readiness_calls: AtomicU32,
    pub download_calls: AtomicU32,
    pub tree_calls: AtomicU32,
    pub list_calls: AtomicU32,
    pub fetched_paths: Mutex<Vec<String>>,
    pub ttls: Mutex<Vec<u64>>,
    pub downloaded_urls: Mutex<Vec<String>>,
}

impl MockShelvClient {
    pub fn new() -> Self {
        Self {
            readiness: Mutex::new(VecDeque::new()),
            download: Err((404, "no archive".to_string())),
            tree: Err((404, "no tree".to_string())),
            files: BTreeMap::new(),
            listing: None,
            defaults: ArchiveDefaults::default(),
            readiness_calls: AtomicU32::new(0),
            download_calls: AtomicU32::new(0),
            tree_calls: AtomicU32::new(0),
            list_calls: AtomicU32::new(0),
            fetched_paths: Mutex::new(Vec::new()),
            ttls: Mutex::new(Vec::new()),
            downloaded_urls: Mutex::new(Vec::new()),
        }
    }

    /// Answer readiness checks with `responses` in order.
    pub fn with_readiness(self, responses: Vec<ArchiveReadiness>) -> Self {
        self.readiness
            .lock()
            .unwrap()
            .extend(responses.into_iter().map(Ok));
        self
    }

    pub fn with_readiness_error(self, status: u16, body: &str) -> Self {
        self.readiness
            .lock()
            .unwrap()
            .push_back(Err((status, body.to_string())));
        self
    }

    /// Serve `bytes` as ready on the first check.
    pub fn with_archive(self, url: &str, bytes: Vec<u8>) -> Self {
        let ready = ready_for(url, &bytes);
        self.with_readiness(vec![ArchiveReadiness::Ready(ready)])
            .with_download(bytes)
    }

    pub fn with_download(mut self, bytes: Vec<u8>) -> Self {
        self.download = Ok(bytes);
        self
    }

    pub fn with_download_error(mut self, status: u16, body: &str) -> Self {
        self.download = Err((status, body.to_string()));
        self
    }

    pub fn with_tree(mut self, tree: TreeResponse) -> Self {
        self.tree = Ok(tree);
        self
    }

    pub fn with_tree_error(mut self, status: u16, body: &str) -> Self {
        self.tree = Err((status, body.to_string()));
        self
    }

    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.files.insert(path.to_string(), text.to_string());
        self
    }

    /// Replace the listing derived from `with_file` entries.
    pub fn with_listing(mut self, listing: ListingResponse) -> Self {
        self.listing = Some(Ok(listing));
        self
    }

    pub fn with_listing_error(mut self, status: u16, body: &str) -> Self {
        self.listing = Some(Err((status, body.to_string())));
        self
    }

    pub fn with_defaults(mut self, defaults: ArchiveDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn readiness_calls(&self) -> u32 {
        self.readiness_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> u32 {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn tree_calls(&self) -> u32 {
        self.tree_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl ShelvClient for MockShelvClient {
    fn archive_readiness<'a>(
        &'a self,
        _shelf_public_id: &'a str,
        ttl_secs: u64,
    ) -> BoxFuture<'a, Result<ArchiveReadiness, ClientError>> {
        Box::pin(async move {
            self.readiness_calls.fetch_add(1, Ordering::SeqCst);
            self.ttls.lock().unwrap().push(ttl_secs);
            let next = self
                .readiness
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ArchiveReadiness::generating(0.0)));
            status_error("/archive-url", next)
        })
    }

    fn download_archive<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, ClientError>> {
        Box::pin(async move {
            self.download_calls.fetch_add(1, Ordering::SeqCst);
            self.downloaded_urls.lock().unwrap().push(url.to_string());
            status_error(url, self.download.clone()).map(Bytes::from)
        })
    }

    fn fetch_tree<'a>(
        &'a self,
        _shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<TreeResponse, ClientError>> {
        Box::pin(async move {
            self.tree_calls.fetch_add(1, Ordering::SeqCst);
            status_error("/tree", self.tree.clone())
        })
    }

    fn list_files<'a>(
        &'a self,
        shelf_public_id: &'a str,
    ) -> BoxFuture<'a, Result<ListingResponse, ClientError>> {
        Box::pin(async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let listing = self.listing.clone().unwrap_or_else(|| {
                Ok(ListingResponse {
                    shelf_public_id: shelf_public_id.to_string(),
                    name: "Docs".to_string(),
                    file_count: self.files.len(),
                    paths: self.files.keys().cloned().collect(),
                })
            });
            status_error("/files", listing)
        })
    }

    fn fetch_file<'a>(
        &'a self,
        _shelf_public_id: &'a str,
        path: &'a str,
    ) -> BoxFuture<'a, Result<String, ClientError>> {
        Box::pin(async move {
            self.fetched_paths.lock().unwrap().push(path.to_string());
            let found = self
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| (404, "file not found".to_string()));
            status_error(path, found)
        })
    }

    fn archive_defaults(&self) -> ArchiveDefaults {
        self.defaults
    }
}
