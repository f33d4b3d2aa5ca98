use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Album,
    Track,
    Artist,
    Label,
    Playlist,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Album => "album",
            ContentKind::Track => "track",
            ContentKind::Artist => "artist",
            ContentKind::Label => "label",
            ContentKind::Playlist => "playlist",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "album" => Some(ContentKind::Album),
            "track" => Some(ContentKind::Track),
            "artist" => Some(ContentKind::Artist),
            "label" => Some(ContentKind::Label),
            "playlist" => Some(ContentKind::Playlist),
            _ => None,
        }
    }

    /// Field of the container metadata that lists its members, or `None` for
    /// leaf kinds that are downloaded as a whole.
    pub fn container_items_key(&self) -> Option<&'static str> {
        match self {
            ContentKind::Album | ContentKind::Track => None,
            ContentKind::Artist | ContentKind::Label => Some("albums"),
            ContentKind::Playlist => Some("tracks"),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference that passed classification. Only built through
/// [`ClassifiedReference::new`] or [`crate::reference::classify`], so the id
/// always has the catalog identifier shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassifiedReference {
    pub(crate) kind: ContentKind,
    pub(crate) id: String,
}

impl ClassifiedReference {
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMember {
    pub id: String,
    pub is_album: bool,
}

#[derive(Debug, Clone)]
pub struct ContainerExpansion {
    pub kind: ContentKind,
    pub id: String,
    pub name: String,
    pub members: Vec<ContainerMember>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Mp3,
    #[default]
    Lossless,
    HiRes96,
    HiRes192,
}

impl Quality {
    pub fn from_format_id(id: u32) -> Option<Self> {
        match id {
            5 => Some(Quality::Mp3),
            6 => Some(Quality::Lossless),
            7 => Some(Quality::HiRes96),
            27 => Some(Quality::HiRes192),
            _ => None,
        }
    }

    pub fn format_id(&self) -> u32 {
        match self {
            Quality::Mp3 => 5,
            Quality::Lossless => 6,
            Quality::HiRes96 => 7,
            Quality::HiRes192 => 27,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Quality::Mp3 => "mp3",
            _ => "flac",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quality::Mp3 => "5 - MP3",
            Quality::Lossless => "6 - FLAC",
            Quality::HiRes96 => "7 - 24B<96kHz",
            Quality::HiRes192 => "27 - 24B>96kHz",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub id: String,
    pub is_album: bool,
    pub destination: PathBuf,
    pub quality: Quality,
}

/// Flags and naming templates handed to the catalog client together with a
/// [`DownloadTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub quality_fallback: bool,
    pub embed_art: bool,
    pub og_cover: bool,
    pub no_cover: bool,
    pub ignore_singles_eps: bool,
    pub folder_format: String,
    pub track_format: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Succeeded,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub cancelled: usize,
    pub failed: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn record(&mut self, id: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Cancelled => self.cancelled += 1,
            Outcome::Failed(reason) => self.failed.push((id.to_string(), reason.clone())),
        }
    }

    /// Records a reference or container that could not be processed at all.
    pub fn record_failure(&mut self, what: &str, reason: impl fmt::Display) {
        self.failed.push((what.to_string(), reason.to_string()));
    }

    pub fn merge(&mut self, other: BatchSummary) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.cancelled += other.cancelled;
        self.failed.extend(other.failed);
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.cancelled + self.failed.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Album,
    Track,
    Artist,
    Playlist,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Album => "album",
            SearchKind::Track => "track",
            SearchKind::Artist => "artist",
            SearchKind::Playlist => "playlist",
        }
    }

    pub fn content_kind(&self) -> ContentKind {
        match self {
            SearchKind::Album => ContentKind::Album,
            SearchKind::Track => ContentKind::Track,
            SearchKind::Artist => ContentKind::Artist,
            SearchKind::Playlist => ContentKind::Playlist,
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub text: String,
    pub url: String,
}

#[derive(Tabled)]
pub struct SearchTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub result: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistTrackRecord {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub title: String,
    pub artist: String,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub downloaded_at: String,
}
