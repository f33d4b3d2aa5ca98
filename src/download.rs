//! Batch orchestration of downloads.
//!
//! A [`Downloader`] takes raw user input (catalog references, listing files
//! and Last.fm playlist pages), resolves it into leaf items and downloads each
//! of them at most once. Every failure is contained at the item that caused
//! it; the batch always runs to the end and reports a [`BatchSummary`].

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{self, Settings},
    info, lastfm, m3u,
    management::DownloadLedger,
    qobuz::CatalogClient,
    reference,
    resolver::{self, Resolution},
    success,
    tags::TagReader,
    types::{BatchSummary, ContainerExpansion, ContainerMember, ContentKind, DownloadTask, Outcome},
    utils, warning,
};

/// Shared handle to the download pipeline. Cloning is cheap and every clone
/// shares the ledger, the in-flight set and the cancellation token.
#[derive(Clone)]
pub struct Downloader {
    client: Arc<dyn CatalogClient>,
    ledger: Option<Arc<dyn DownloadLedger>>,
    tag_reader: Arc<dyn TagReader>,
    settings: Arc<Settings>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    cancel: CancellationToken,
}

impl Downloader {
    /// Creates a downloader. Without a ledger nothing is skipped and nothing
    /// is recorded.
    pub fn new(
        client: Arc<dyn CatalogClient>,
        ledger: Option<Arc<dyn DownloadLedger>>,
        tag_reader: Arc<dyn TagReader>,
        settings: Settings,
    ) -> Self {
        Self {
            client,
            ledger,
            tag_reader,
            settings: Arc::new(settings),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            cancel: CancellationToken::new(),
        }
    }

    pub fn client(&self) -> &dyn CatalogClient {
        self.client.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Token that stops the batch. Items not yet started end up
    /// [`Outcome::Cancelled`] and a running transfer is abandoned.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Downloads everything `sources` refers to, in order.
    ///
    /// Sources naming an existing file are read as listing files and expanded
    /// in place. Last.fm pages go to the playlist importer, everything else is
    /// classified as a catalog reference.
    pub async fn download_many(&self, sources: &[String]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let inputs = expand_sources(sources, &mut summary).await;

        if inputs.is_empty() {
            info!("Nothing to download");
            return summary;
        }

        for input in inputs {
            if self.cancel.is_cancelled() {
                summary.cancelled += 1;
                continue;
            }

            let part = if lastfm::is_foreign_playlist(&input) {
                lastfm::import_foreign_playlist(self, &input).await
            } else {
                self.download_reference(&input).await
            };
            summary.merge(part);
        }

        report(&summary);
        summary
    }

    /// Downloads a single leaf into `destination`.
    ///
    /// Ids already in the ledger are skipped without any network work. The id
    /// is recorded only after the transfer completed.
    pub async fn download_one(&self, id: &str, is_album: bool, destination: &Path) -> Outcome {
        if self.cancel.is_cancelled() {
            return Outcome::Cancelled;
        }

        let Some(_claim) = InFlightClaim::acquire(&self.in_flight, id) else {
            info!("{} is already being downloaded", id);
            return Outcome::Skipped;
        };

        if let Some(ledger) = &self.ledger {
            match ledger.contains(id).await {
                Ok(true) => {
                    info!("{} was already downloaded, skipping", id);
                    return Outcome::Skipped;
                }
                Ok(false) => {}
                Err(e) => warning!("Cannot query download ledger for {}: {}", id, e),
            }
        }

        let task = DownloadTask {
            id: id.to_string(),
            is_album,
            destination: destination.to_path_buf(),
            quality: self.settings.quality,
        };
        let options = self.settings.fetch_options();

        let result = tokio::select! {
            _ = self.cancel.cancelled() => {
                warning!("Download of {} cancelled", id);
                return Outcome::Cancelled;
            }
            result = self.client.fetch_content(&task, &options) => result,
        };

        match result {
            Ok(()) => {
                if let Some(ledger) = &self.ledger {
                    if let Err(e) = ledger.insert(id).await {
                        warning!("Cannot record {} in the download ledger: {}", id, e);
                    }
                }
                success!("Completed {}", id);
                Outcome::Succeeded
            }
            Err(e) => {
                warning!("Cannot download {}: {}", id, e);
                Outcome::Failed(e.to_string())
            }
        }
    }

    /// Writes the M3U playlist of `directory` unless playlists are disabled.
    pub async fn assemble_playlist(&self, directory: PathBuf) {
        if self.settings.no_m3u {
            return;
        }

        let reader = Arc::clone(&self.tag_reader);
        let label = directory.display().to_string();
        match tokio::task::spawn_blocking(move || m3u::build_m3u(&directory, reader.as_ref())).await
        {
            Ok(Ok(Some(path))) => success!("Playlist written to {}", path.display()),
            Ok(Ok(None)) => info!("No readable tracks in {}, no playlist written", label),
            Ok(Err(e)) => warning!("Cannot write playlist for {}: {}", label, e),
            Err(e) => warning!("Playlist task for {} failed: {}", label, e),
        }
    }

    async fn download_reference(&self, raw: &str) -> BatchSummary {
        let mut summary = BatchSummary::default();

        let reference = match reference::classify(raw) {
            Ok(reference) => reference,
            Err(e) => {
                warning!("{}", e);
                summary.record_failure(raw, e);
                return summary;
            }
        };

        match resolver::resolve(
            self.client.as_ref(),
            &reference,
            self.settings.smart_discography,
        )
        .await
        {
            Ok(Resolution::Leaf(member)) => {
                let outcome = self
                    .download_one(&member.id, member.is_album, &self.settings.directory)
                    .await;
                summary.record(&member.id, &outcome);
            }
            Ok(Resolution::Container(expansion)) => {
                summary.merge(self.download_container(expansion).await);
            }
            Err(e) => {
                warning!("{}", e);
                summary.record_failure(raw, e);
            }
        }

        summary
    }

    async fn download_container(&self, expansion: ContainerExpansion) -> BatchSummary {
        let mut summary = BatchSummary::default();

        if expansion.members.is_empty() {
            info!(
                "{} '{}' has nothing to download, skipping",
                expansion.kind, expansion.name
            );
            return summary;
        }

        let destination =
            match resolver::prepare_destination(&self.settings.directory, &expansion).await {
                Ok(path) => path,
                Err(e) => {
                    warning!("{}", e);
                    summary.record_failure(&expansion.id, e);
                    return summary;
                }
            };

        info!(
            "Downloading {} '{}' ({} items) into {}",
            expansion.kind,
            expansion.name,
            expansion.members.len(),
            destination.display()
        );

        for (id, outcome) in self.download_members(&expansion.members, &destination).await {
            summary.record(&id, &outcome);
        }

        if expansion.kind == ContentKind::Playlist {
            self.assemble_playlist(destination).await;
        }

        summary
    }

    /// Downloads container members, one at a time or through a pool of
    /// `workers` tasks. Outcomes are returned in member order either way.
    async fn download_members(
        &self,
        members: &[ContainerMember],
        destination: &Path,
    ) -> Vec<(String, Outcome)> {
        let workers = config::clamp_workers(self.settings.workers);
        if workers <= 1 {
            let mut outcomes = Vec::with_capacity(members.len());
            for member in members {
                let outcome = self
                    .download_one(&member.id, member.is_album, destination)
                    .await;
                outcomes.push((member.id.clone(), outcome));
            }
            return outcomes;
        }

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(members.len());

        for member in members.iter().cloned() {
            let downloader = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let destination = destination.to_path_buf();
            let id = member.id.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Outcome::Cancelled;
                };
                downloader
                    .download_one(&member.id, member.is_album, &destination)
                    .await
            });
            handles.push((id, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Outcome::Failed(format!("download task failed: {}", e)),
            };
            outcomes.push((id, outcome));
        }
        outcomes
    }
}

/// Prints the result of a batch.
pub fn report(summary: &BatchSummary) {
    if summary.total() == 0 {
        return;
    }

    success!(
        "Done: {} downloaded, {} skipped, {} failed",
        summary.succeeded,
        summary.skipped,
        summary.failed.len()
    );
    if summary.cancelled > 0 {
        warning!("{} items cancelled", summary.cancelled);
    }
    for (what, reason) in &summary.failed {
        warning!("Failed {}: {}", what, reason);
    }
}

/// Replaces listing files by the references they contain, keeping order.
/// Nested listing files are expanded too, but no file twice.
async fn expand_sources(sources: &[String], summary: &mut BatchSummary) -> Vec<String> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut expanded = Vec::new();
    let mut pending: Vec<String> = sources.iter().rev().cloned().collect();

    while let Some(source) = pending.pop() {
        let source = source.trim().to_string();
        if source.is_empty() {
            continue;
        }

        if lastfm::is_foreign_playlist(&source) || !Path::new(&source).is_file() {
            expanded.push(source);
            continue;
        }

        let key = async_fs::canonicalize(&source)
            .await
            .unwrap_or_else(|_| PathBuf::from(&source));
        if !visited.insert(key) {
            warning!("Listing file {} was already read, skipping", source);
            continue;
        }

        match async_fs::read_to_string(&source).await {
            Ok(content) => {
                let lines = utils::parse_listing(&content);
                info!("Read {} references from {}", lines.len(), source);
                pending.extend(lines.into_iter().rev());
            }
            Err(e) => {
                warning!("Cannot read listing file {}: {}", source, e);
                summary.record_failure(&source, e);
            }
        }
    }

    expanded
}

/// Marks an id as being transferred for as long as the claim lives.
struct InFlightClaim {
    set: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl InFlightClaim {
    fn acquire(set: &Arc<Mutex<HashSet<String>>>, id: &str) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string());

        inserted.then(|| Self {
            set: Arc::clone(set),
            id: id.to_string(),
        })
    }
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
