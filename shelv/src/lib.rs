//! Shelf source resolution for the Shelv document service.
//!
//! A shelf is a collection of text documents. This crate turns a shelf id into
//! an in-memory `path → text` mapping, preferring the shelf's downloadable
//! archive and falling back to the pre-built file tree.
//!
//! # Overview
//!
//! - [`archive`]: gzip+tar decoding and SHA-256 verification
//! - [`client`]: the [`ShelvClient`] contract and its HTTP implementation
//! - [`resolver`]: archive polling, tree fetching, the mode policy and lazy
//!   listings
//! - [`sandbox`]: writing resolved files into sandbox targets
//!
//! # Example
//!
//! ```no_run
//! use shelv::{HttpShelvClient, ResolveRequest, ShelfResolver, ShelvConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpShelvClient::new(ShelvConfig::from_env()?)?;
//! let resolver = ShelfResolver::new(client);
//!
//! let source = resolver.resolve(&ResolveRequest::new("shf_123")).await?;
//! for (path, text) in source.entries() {
//!     println!("{path}: {} bytes", text.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod sandbox;
pub mod types;

pub use client::{ClientError, HttpShelvClient, ListingResponse, ShelvClient};
pub use config::{ArchiveDefaults, ConfigError, ShelvConfig};
pub use error::{AdapterError, AdapterResult, ErrorCode};
pub use resolver::{list_shelf, resolve_shelf_source, FallbackObserver, LazyShelf, ShelfResolver};
pub use sandbox::{
    hydrate, snapshot, DirectoryTarget, HydrateResult, SandboxTarget, SnapshotResult,
};
pub use types::{
    ArchiveSource, ResolveRequest, ShelfFiles, ShelfSource, ShelfSourceMode, SourceKind,
    TreeSource,
};
