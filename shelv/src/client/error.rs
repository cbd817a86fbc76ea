//! Error types for the Shelv HTTP client.

use thiserror::Error;

/// Errors raised by a [`ShelvClient`](super::ShelvClient) implementation.
///
/// The resolver treats these as opaque causes; only [`ClientError::status`]
/// and [`ClientError::body`] are inspected, for diagnostics.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("request failed ({status}) for {path}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response decoded but violates the API contract.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A request URL could not be built.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ClientError {
    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Body of the failed response, when there was one.
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
