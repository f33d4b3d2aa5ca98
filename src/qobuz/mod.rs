//! # Qobuz Integration Module
//!
//! This module defines the [`CatalogClient`] contract the download pipeline is
//! written against, and the [`QobuzClient`] that implements it over the Qobuz
//! JSON API.
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer
//!     ↓
//! Pipeline (reference, resolver, download, search, lastfm, m3u)
//!     ↓
//! CatalogClient trait
//!     ↓
//! QobuzClient
//!     ├── client   (login, signed requests, metadata, search)
//!     └── transfer (file urls, quality policy, audio + cover download)
//!          ↓
//! Qobuz API (reqwest, JSON)
//! ```
//!
//! ## Timeouts
//!
//! API calls use a client-wide timeout. Audio transfers only bound the
//! connection and each body chunk, so large files are not cut off while a
//! stalled host still cannot block a batch forever.
//!
//! ## Quality fallback
//!
//! Qobuz itself decides which tier it can stream and answers a file url
//! request with the best format it has up to the requested one. The client
//! accepts such a downgrade only when fallback is enabled; otherwise the item
//! is reported as not streamable.

mod client;
mod transfer;

use async_trait::async_trait;
use serde_json::Value;

pub use client::QobuzClient;

use crate::{
    errors::{CatalogError, FetchError},
    types::{ContentKind, DownloadTask, FetchOptions, SearchKind},
};

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Metadata of a single catalog object. Container kinds are returned with
    /// their member list (`albums` or `tracks`) fully paginated.
    async fn get_metadata(&self, kind: ContentKind, id: &str) -> Result<Value, CatalogError>;

    /// Raw search response, keyed by the plural of the searched kind.
    async fn search(&self, kind: SearchKind, query: &str, limit: u32)
    -> Result<Value, CatalogError>;

    /// Downloads a leaf item into `task.destination`.
    async fn fetch_content(
        &self,
        task: &DownloadTask,
        options: &FetchOptions,
    ) -> Result<(), FetchError>;
}
