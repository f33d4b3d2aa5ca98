//! Audio tag access through lofty, which handles both FLAC (Vorbis comments)
//! and MP3 (ID3v2) files.

use std::path::Path;

use lofty::{
    config::WriteOptions,
    error::LoftyError,
    picture::{MimeType, Picture, PictureType},
    prelude::*,
    tag::Tag,
};

use crate::{errors::TagReadError, types::TrackTags};

pub trait TagReader: Send + Sync {
    fn read_tags(&self, path: &Path) -> Result<TrackTags, TagReadError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> Result<TrackTags, TagReadError> {
        let tagged = lofty::read_from_path(path).map_err(|e| TagReadError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let missing = |field: &'static str| TagReadError::MissingField {
            path: path.to_path_buf(),
            field,
        };

        let tag = tagged
            .primary_tag()
            .or_else(|| tagged.first_tag())
            .ok_or_else(|| missing("TITLE"))?;

        let title = tag
            .title()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| missing("TITLE"))?;
        let artist = tag
            .artist()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| missing("ARTIST"))?;

        Ok(TrackTags {
            title,
            artist,
            duration_seconds: tagged.properties().duration().as_secs(),
        })
    }
}

/// Tag values written to a freshly downloaded file.
pub struct TrackMetadata<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub album: &'a str,
    pub track_number: Option<u32>,
    pub cover: Option<&'a [u8]>,
}

pub fn write_tags(path: &Path, metadata: &TrackMetadata<'_>) -> Result<(), LoftyError> {
    let mut tagged = lofty::read_from_path(path)?;

    if tagged.primary_tag().is_none() {
        let tag_type = tagged.primary_tag_type();
        tagged.insert_tag(Tag::new(tag_type));
    }

    if let Some(tag) = tagged.primary_tag_mut() {
        tag.set_title(metadata.title.to_string());
        tag.set_artist(metadata.artist.to_string());
        tag.set_album(metadata.album.to_string());
        if let Some(number) = metadata.track_number {
            tag.set_track(number);
        }
        if let Some(cover) = metadata.cover {
            tag.push_picture(Picture::new_unchecked(
                PictureType::CoverFront,
                Some(MimeType::Jpeg),
                None,
                cover.to_vec(),
            ));
        }
    }

    tagged.save_to_path(path, WriteOptions::default())
}
