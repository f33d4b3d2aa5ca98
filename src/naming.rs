//! Folder and file names of downloaded albums and tracks.
//!
//! Both are rendered from user templates through [`format::render`], so a
//! field the catalog doesn't provide becomes `n/a` instead of an error. The
//! result is always a single sanitized path component.
//!
//! Album folder fields: `artist`, `album`, `year`, `version`, `label`,
//! `bit_depth`, `sampling_rate`.
//!
//! Track file fields: `tracknumber` (zero padded), `tracktitle` (with its
//! version), `artist`, `album`, `composer`, `disc`, `bit_depth`,
//! `sampling_rate`.

use serde_json::{Value, json};

use crate::{format, utils};

pub const DEFAULT_FOLDER_FORMAT: &str = "{artist} - {album}";
pub const DEFAULT_TRACK_FORMAT: &str = "{tracknumber}. {tracktitle}";

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

pub fn album_artist(album: &Value) -> &str {
    album["artist"]["name"].as_str().unwrap_or(UNKNOWN_ARTIST)
}

pub fn album_title(album: &Value) -> &str {
    album["title"].as_str().unwrap_or(UNKNOWN_ALBUM)
}

/// Track title with its version appended, e.g. `Song (Live)`.
pub fn track_title(track: &Value) -> String {
    let title = track["title"].as_str().unwrap_or("Unknown").trim();
    match track["version"].as_str().map(str::trim) {
        Some(version) if !version.is_empty() => format!("{} ({})", title, version),
        _ => title.to_string(),
    }
}

pub fn album_folder_name(template: &str, album: &Value) -> String {
    let fields = json!({
        "artist": album_artist(album),
        "album": album_title(album),
        "year": album["release_date_original"].as_str().and_then(|d| d.get(..4)),
        "version": album["version"],
        "label": album["label"]["name"],
        "bit_depth": album["maximum_bit_depth"],
        "sampling_rate": album["maximum_sampling_rate"],
    });
    utils::sanitize_filename(&format::render(template, &fields))
}

/// File name of a track without its extension.
pub fn track_file_stem(template: &str, track: &Value, album: &Value, number: u32) -> String {
    let fields = json!({
        "tracknumber": format!("{:02}", number),
        "tracktitle": track_title(track),
        "artist": track["performer"]["name"].as_str().unwrap_or(album_artist(album)),
        "album": album_title(album),
        "composer": track["composer"]["name"],
        "disc": track["media_number"],
        "bit_depth": track["maximum_bit_depth"],
        "sampling_rate": track["maximum_sampling_rate"],
    });
    utils::sanitize_filename(&format::render(template, &fields))
}
