//! Shared helpers for HTTP-level tests.

#![allow(dead_code)]

use std::io::Write;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelv::archive::sha256_hex;
use shelv::ShelvConfig;

pub const API_KEY: &str = "sk_test_123";

/// Build a tar.gz archive of regular text files.
pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, text) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(text.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, text.as_bytes())
            .unwrap();
    }
    let tar = builder.into_inner().unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar).unwrap();
    encoder.finish().unwrap()
}

/// Configuration pointed at `server` with fast polling.
pub fn config_for(server: &MockServer) -> ShelvConfig {
    ShelvConfig::new(API_KEY)
        .with_api_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(10))
        .with_max_poll_attempts(3)
        .with_request_timeout(Duration::from_secs(5))
}

pub fn download_url(server: &MockServer, shelf_id: &str) -> String {
    format!("{}/downloads/{}.tar.gz", server.uri(), shelf_id)
}

pub fn ready_body(url: &str, bytes: &[u8]) -> Value {
    json!({
        "url": url,
        "expiresAt": "2026-01-01T00:10:00.000Z",
        "sha256": sha256_hex(bytes),
        "sizeBytes": bytes.len(),
        "version": "2026-01-01T00:00:00.000Z"
    })
}

pub fn generating_body(retry_after: f64) -> Value {
    json!({ "status": "generating", "retryAfter": retry_after })
}

pub fn tree_body(shelf_id: &str, files: &[(&str, &str)]) -> Value {
    let files: serde_json::Map<String, Value> = files
        .iter()
        .map(|(path, text)| (path.to_string(), Value::from(*text)))
        .collect();
    let file_count = files.len();
    json!({
        "shelfPublicId": shelf_id,
        "name": "Docs",
        "fileCount": file_count,
        "files": files
    })
}

pub fn listing_body(shelf_id: &str, paths: &[&str]) -> Value {
    json!({
        "shelfPublicId": shelf_id,
        "name": "Docs",
        "fileCount": paths.len(),
        "paths": paths
    })
}

/// Serve `bytes` as a ready archive for `shelf_id`.
pub async fn mount_archive(server: &MockServer, shelf_id: &str, bytes: Vec<u8>) {
    let url = download_url(server, shelf_id);

    Mock::given(method("GET"))
        .and(path(format!("/v1/shelves/{}/archive-url", shelf_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(ready_body(&url, &bytes)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/downloads/{}.tar.gz", shelf_id)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
}

pub async fn mount_tree(server: &MockServer, shelf_id: &str, files: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/shelves/{}/tree", shelf_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(tree_body(shelf_id, files)))
        .mount(server)
        .await;
}
