//! M3U playlist assembly from a directory of downloaded audio files.
//!
//! The directory tree is walked in file name order so the same tree always
//! yields the same playlist. Files whose tags cannot be read are left out.

use std::{
    fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{tags::TagReader, types::PlaylistTrackRecord, utils};

pub const HEADER: &str = "#EXTM3U";

/// Writes `<directory>/<directory name>.m3u` listing every readable audio file
/// below `directory`.
///
/// Returns the playlist path, or `None` when no track could be listed, in
/// which case no file is written.
pub fn build_m3u(
    directory: &Path,
    reader: &dyn TagReader,
) -> Result<Option<PathBuf>, std::io::Error> {
    let records = collect_tracks(directory, reader);
    if records.is_empty() {
        return Ok(None);
    }

    let path = directory.join(format!("{}.m3u", playlist_name(directory)));
    fs::write(&path, render_playlist(&records))?;
    Ok(Some(path))
}

pub fn collect_tracks(directory: &Path, reader: &dyn TagReader) -> Vec<PlaylistTrackRecord> {
    let mut records = Vec::new();

    let folders = WalkDir::new(directory)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir());

    for folder in folders {
        let audio_files: Vec<PathBuf> = WalkDir::new(folder.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && utils::is_audio_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        let relative_paths: Vec<String> = audio_files
            .iter()
            .filter_map(|file| file.strip_prefix(directory).ok())
            .map(|rel| rel.to_string_lossy().into_owned())
            .collect();

        if audio_files.is_empty() || audio_files.len() != relative_paths.len() {
            continue;
        }

        for (absolute_path, relative_path) in audio_files.into_iter().zip(relative_paths) {
            let Ok(tags) = reader.read_tags(&absolute_path) else {
                continue;
            };

            records.push(PlaylistTrackRecord {
                relative_path,
                absolute_path,
                title: tags.title,
                artist: tags.artist,
                duration_seconds: tags.duration_seconds,
            });
        }
    }

    records
}

pub fn render_playlist(records: &[PlaylistTrackRecord]) -> String {
    let mut entries = vec![HEADER.to_string()];
    entries.extend(records.iter().map(|record| {
        format!(
            "#EXTINF:{}, {} - {}\n{}",
            record.duration_seconds, record.artist, record.title, record.relative_path
        )
    }));
    entries.join("\n\n")
}

fn playlist_name(directory: &Path) -> String {
    let name = directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            directory
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "playlist".to_string());
    utils::sanitize_filename(&name)
}
