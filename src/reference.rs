//! Classification of raw content references into `(kind, id)` pairs.
//!
//! Accepted shapes:
//!
//! ```text
//! https://play.qobuz.com/album/0060254735180
//! open.qobuz.com/track/52151405
//! https://www.qobuz.com/us-en/album/some-album-slug/0060254735180
//! /us-en/album/some-album-slug/0060254735180
//! https://play.qobuz.com/user/library/favorites/1234
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    errors::ClassificationError,
    types::{ClassifiedReference, ContentKind},
};

pub const WEB_URL: &str = "https://play.qobuz.com/";

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:https?://)?(?:(?:www|play|open)\.)?qobuz\.com)?(?P<path>/[^?#]*)(?:[?#].*)?$",
    )
    .expect("reference pattern")
});

static LOCALE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}-[a-z]{2}$").expect("locale pattern"));

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("id pattern"));

impl ClassifiedReference {
    pub fn new(kind: ContentKind, id: impl Into<String>) -> Result<Self, ClassificationError> {
        let id = id.into();
        if !ID_PATTERN.is_match(&id) {
            return Err(ClassificationError::Unparseable(id));
        }
        Ok(Self { kind, id })
    }

    /// Canonical web player URL, the form produced by search results.
    pub fn url(&self) -> String {
        format!("{WEB_URL}{kind}/{id}", kind = self.kind, id = self.id)
    }
}

/// Parses a raw reference into its content kind and catalog id.
///
/// # Errors
///
/// - [`ClassificationError::Unparseable`] when the host is not Qobuz, the path
///   is empty, or no valid id can be extracted
/// - [`ClassificationError::UnknownType`] when the type keyword is not one of
///   `album`, `track`, `artist`, `label`, `playlist`
pub fn classify(raw: &str) -> Result<ClassifiedReference, ClassificationError> {
    let trimmed = raw.trim();
    let unparseable = || ClassificationError::Unparseable(trimmed.to_string());

    let captures = REFERENCE_PATTERN.captures(trimmed).ok_or_else(unparseable)?;
    let path = captures.name("path").map_or("", |m| m.as_str());
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let first = *segments.first().ok_or_else(unparseable)?;

    // favorites-style references are treated as playlists
    if first == "user" {
        let id = segments
            .iter()
            .skip_while(|s| **s != "favorites")
            .nth(1)
            .or_else(|| segments.iter().skip(1).last())
            .ok_or_else(unparseable)?;
        return ClassifiedReference::new(ContentKind::Playlist, *id).map_err(|_| unparseable());
    }

    let (keyword, id) = if LOCALE_PATTERN.is_match(first) {
        // store paths may carry a slug between the keyword and the id
        let keyword = segments.get(1).copied().ok_or_else(unparseable)?;
        let id = if segments.len() > 2 {
            segments.last().copied()
        } else {
            None
        };
        (keyword, id)
    } else {
        (first, segments.get(1).copied())
    };

    let kind =
        ContentKind::from_keyword(keyword).ok_or_else(|| ClassificationError::UnknownType {
            raw: trimmed.to_string(),
            keyword: keyword.to_string(),
        })?;

    let id = id.ok_or_else(unparseable)?;
    ClassifiedReference::new(kind, id).map_err(|_| unparseable())
}
