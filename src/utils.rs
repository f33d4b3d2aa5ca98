use std::path::Path;

use chrono::NaiveTime;
use serde_json::Value;

use crate::types::{Quality, SearchKind};

pub const AUDIO_EXTENSIONS: [&str; 2] = ["mp3", "flac"];

/// Replaces characters that are invalid in file names on common platforms
/// and trims surrounding whitespace and dots.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        return "_".to_string();
    }

    // keep room for an extension on file systems with a 255 byte limit
    let mut end = trimmed.len().min(200);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

/// Formats seconds as `HH:MM:SS`. Durations of a day or more wrap around.
pub fn format_duration(seconds: u64) -> String {
    let secs = (seconds % 86_400) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "00:00:00".to_string())
}

/// Splits the content of a listing file into references, dropping blank
/// lines and lines whose trimmed content starts with `#`.
pub fn parse_listing(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

pub fn parse_quality(value: &str) -> Result<Quality, String> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(Quality::from_format_id)
        .ok_or_else(|| format!("invalid quality '{}', expected one of 5, 6, 7, 27", value))
}

pub fn parse_search_kind(value: &str) -> Result<SearchKind, String> {
    match value.trim().to_lowercase().trim_end_matches('s') {
        "album" => Ok(SearchKind::Album),
        "track" => Ok(SearchKind::Track),
        "artist" => Ok(SearchKind::Artist),
        "playlist" => Ok(SearchKind::Playlist),
        _ => Err(format!(
            "invalid type '{}', expected album, track, artist or playlist",
            value
        )),
    }
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Catalog ids arrive as strings for albums and as numbers for tracks.
pub fn value_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
