//! Importer for Last.fm playlist pages.
//!
//! The page is scraped for artist and title columns; every row is looked up
//! in the catalog with a single-hit track search and downloaded into a folder
//! named after the page heading.

use std::time::Duration;

use scraper::{Html, Selector};

use crate::{
    download::Downloader,
    errors::ImportError,
    info, reference, search,
    types::{BatchSummary, SearchKind},
    utils, warning,
};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const ARTIST_SELECTOR: &str = "td.chartlist-artist > a";
const TITLE_SELECTOR: &str = "td.chartlist-name > a";
const HEADING_SELECTOR: &str = "h1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignPlaylist {
    pub title: String,
    /// `"<artist> <title>"` search queries in page order.
    pub queries: Vec<String>,
}

pub fn is_foreign_playlist(raw: &str) -> bool {
    raw.contains("last.fm")
}

/// Extracts the playlist heading and one query per row.
///
/// # Errors
///
/// [`ImportError::NothingFound`] when the page has no rows or the artist and
/// title columns don't line up.
pub fn parse_playlist_page(html: &str) -> Result<ForeignPlaylist, ImportError> {
    let document = Html::parse_document(html);

    let artists = select_texts(&document, ARTIST_SELECTOR)?;
    let titles = select_texts(&document, TITLE_SELECTOR)?;
    if artists.is_empty() || artists.len() != titles.len() {
        return Err(ImportError::NothingFound);
    }

    let title = select_texts(&document, HEADING_SELECTOR)?
        .into_iter()
        .find(|h| !h.is_empty())
        .unwrap_or_else(|| "Last.fm playlist".to_string());

    let queries = artists
        .iter()
        .zip(&titles)
        .map(|(artist, title)| format!("{} {}", artist, title))
        .collect();

    Ok(ForeignPlaylist { title, queries })
}

pub async fn fetch_page(url: &str) -> Result<String, ImportError> {
    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(html)
}

/// Fetches a Last.fm playlist page and downloads every track it lists.
pub async fn import_foreign_playlist(downloader: &Downloader, url: &str) -> BatchSummary {
    let mut summary = BatchSummary::default();

    let playlist = match fetch_page(url).await.and_then(|html| parse_playlist_page(&html)) {
        Ok(playlist) => playlist,
        Err(ImportError::NothingFound) => {
            info!("Nothing found on {}", url);
            return summary;
        }
        Err(e) => {
            warning!("Cannot import {}: {}", url, e);
            summary.record_failure(url, e);
            return summary;
        }
    };

    summary.merge(download_playlist(downloader, &playlist).await);
    summary
}

/// Downloads the tracks of an already parsed playlist into
/// `<directory>/<sanitized heading>` and writes its M3U file.
pub async fn download_playlist(downloader: &Downloader, playlist: &ForeignPlaylist) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let cancel = downloader.cancel_token();

    let destination = downloader
        .settings()
        .directory
        .join(utils::sanitize_filename(&playlist.title));
    if let Err(e) = async_fs::create_dir_all(&destination).await {
        warning!("Cannot create {}: {}", destination.display(), e);
        summary.record_failure(&playlist.title, e);
        return summary;
    }

    info!(
        "Importing {} tracks from '{}'",
        playlist.queries.len(),
        playlist.title
    );

    for query in &playlist.queries {
        if cancel.is_cancelled() {
            summary.cancelled += 1;
            continue;
        }

        let hits = search::lucky(downloader.client(), query, SearchKind::Track, 1).await;
        let Some(url) = hits.first() else {
            warning!("No track found for \"{}\"", query);
            summary.record_failure(query, "no matching track");
            continue;
        };

        match reference::classify(url) {
            Ok(track) => {
                let outcome = downloader
                    .download_one(track.id(), false, &destination)
                    .await;
                summary.record(track.id(), &outcome);
            }
            Err(e) => {
                warning!("{}", e);
                summary.record_failure(query, e);
            }
        }
    }

    downloader.assemble_playlist(destination).await;
    summary
}

fn select_texts(document: &Html, selector: &str) -> Result<Vec<String>, ImportError> {
    let parsed =
        Selector::parse(selector).map_err(|_| ImportError::Selector(selector.to_string()))?;

    Ok(document
        .select(&parsed)
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect())
}
