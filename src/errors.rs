//! Error types for every stage of the download pipeline.
//!
//! Each error is contained at the smallest unit of work that produced it (a
//! single reference, container, track or file) and reported through the log
//! macros. Only [`ConfigError`], [`LedgerError`] on open and a failed login are
//! allowed to stop the program, and only before any download starts.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ContentKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("unparseable reference: {0}")]
    Unparseable(String),

    #[error("unknown type '{keyword}' in reference: {raw}")]
    UnknownType { raw: String, keyword: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("cannot fetch {kind} {id}: {source}")]
    Catalog {
        kind: ContentKind,
        id: String,
        #[source]
        source: CatalogError,
    },

    #[error("{kind} {id} has no '{key}' items")]
    MissingItems {
        kind: ContentKind,
        id: String,
        key: &'static str,
    },

    #[error("cannot create destination {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single leaf transfer.
///
/// Both variants mark the item as failed and keep the batch running; neither
/// records the item in the ledger.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not streamable: {0}")]
    NonStreamable(String),

    #[error("transfer failed: {0}")]
    Transient(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transient(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Transient(err.to_string())
    }
}

impl From<CatalogError> for FetchError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Malformed(msg) => FetchError::NonStreamable(msg),
            other => FetchError::Transient(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum TagReadError {
    #[error("cannot read tags from {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("{path} has no {field} tag")]
    MissingField { path: PathBuf, field: &'static str },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("playlist page request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("invalid selector '{0}'")]
    Selector(String),

    #[error("playlist page has no usable tracks")]
    NothingFound,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}
