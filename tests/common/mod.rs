#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;

use qobuzdl::{
    config::Settings,
    download::Downloader,
    errors::{CatalogError, FetchError, TagReadError},
    management::DownloadLedger,
    qobuz::CatalogClient,
    tags::TagReader,
    types::{ContentKind, DownloadTask, FetchOptions, SearchKind, TrackTags},
};

/// In-memory catalog. Every successful fetch writes `<id>.flac` into the task
/// destination, containing `Title <id>|Artist|60` so [`FileTagReader`] can
/// read it back. With a delay set, every fetch sleeps before finishing so
/// transfers overlap.
#[derive(Default)]
pub struct FakeCatalog {
    metadata: HashMap<(ContentKind, String), Value>,
    search_responses: HashMap<String, Value>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    pub fetched: Mutex<Vec<DownloadTask>>,
    pub metadata_calls: Mutex<usize>,
    pub search_calls: Mutex<Vec<(SearchKind, String, u32)>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, kind: ContentKind, id: &str, value: Value) -> Self {
        self.metadata.insert((kind, id.to_string()), value);
        self
    }

    pub fn with_search(mut self, query: &str, response: Value) -> Self {
        self.search_responses.insert(query.to_string(), response);
        self
    }

    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetched_ids(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn fetched_tasks(&self) -> Vec<DownloadTask> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn get_metadata(&self, kind: ContentKind, id: &str) -> Result<Value, CatalogError> {
        *self.metadata_calls.lock().unwrap() += 1;
        self.metadata
            .get(&(kind, id.to_string()))
            .cloned()
            .ok_or_else(|| CatalogError::Api {
                status: 404,
                message: format!("{} {} not found", kind, id),
            })
    }

    async fn search(
        &self,
        kind: SearchKind,
        query: &str,
        limit: u32,
    ) -> Result<Value, CatalogError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((kind, query.to_string(), limit));
        self.search_responses
            .get(query)
            .cloned()
            .ok_or_else(|| CatalogError::Api {
                status: 500,
                message: "search unavailable".to_string(),
            })
    }

    async fn fetch_content(
        &self,
        task: &DownloadTask,
        _options: &FetchOptions,
    ) -> Result<(), FetchError> {
        self.fetched.lock().unwrap().push(task.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&task.id) {
            return Err(FetchError::Transient(format!("{} broke", task.id)));
        }

        fs::create_dir_all(&task.destination)?;
        fs::write(
            task.destination.join(format!("{}.flac", task.id)),
            format!("Title {}|Artist|60", task.id),
        )?;
        Ok(())
    }
}

/// Reads `title|artist|seconds` from the file content. Anything else is
/// unreadable.
pub struct FileTagReader;

impl TagReader for FileTagReader {
    fn read_tags(&self, path: &Path) -> Result<TrackTags, TagReadError> {
        let unreadable = |message: &str| TagReadError::Unreadable {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        let content = fs::read_to_string(path).map_err(|e| unreadable(&e.to_string()))?;
        let parts: Vec<&str> = content.trim().split('|').collect();
        match parts.as_slice() {
            [title, artist, seconds] => Ok(TrackTags {
                title: title.to_string(),
                artist: artist.to_string(),
                duration_seconds: seconds.parse().map_err(|_| unreadable("bad duration"))?,
            }),
            _ => Err(unreadable("no tags")),
        }
    }
}

/// Ledger whose every operation fails.
pub struct BrokenLedger;

#[async_trait]
impl DownloadLedger for BrokenLedger {
    async fn contains(&self, _id: &str) -> Result<bool, qobuzdl::errors::LedgerError> {
        Err(std::io::Error::other("ledger offline").into())
    }

    async fn insert(&self, _id: &str) -> Result<(), qobuzdl::errors::LedgerError> {
        Err(std::io::Error::other("ledger offline").into())
    }
}

pub fn test_settings(directory: &Path) -> Settings {
    Settings {
        directory: directory.to_path_buf(),
        downloads_db: None,
        ..Settings::default()
    }
}

pub fn downloader(
    catalog: &Arc<FakeCatalog>,
    ledger: Option<Arc<dyn DownloadLedger>>,
    settings: Settings,
) -> Downloader {
    Downloader::new(
        catalog.clone(),
        ledger,
        Arc::new(FileTagReader),
        settings,
    )
}

pub fn write_track(path: &Path, title: &str, artist: &str, seconds: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("{}|{}|{}", title, artist, seconds)).unwrap();
}
