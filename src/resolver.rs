use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use serde_json::Value;

use crate::{
    errors::ResolutionError,
    qobuz::CatalogClient,
    types::{ClassifiedReference, ContainerExpansion, ContainerMember, ContentKind},
    utils,
};

#[derive(Debug, Clone)]
pub enum Resolution {
    /// Tracks and albums are downloaded as a unit; nothing is fetched yet.
    Leaf(ContainerMember),
    Container(ContainerExpansion),
}

static REMASTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(re)?master(ed)?").expect("valid regex"));

/// Resolves a classified reference into either a single leaf or the member
/// list of a container. Only containers cause a catalog request. With
/// `reduce_discography` an artist expands through [`smart_discography`].
pub async fn resolve(
    client: &dyn CatalogClient,
    reference: &ClassifiedReference,
    reduce_discography: bool,
) -> Result<Resolution, ResolutionError> {
    let kind = reference.kind();
    let id = reference.id();

    match kind {
        ContentKind::Album | ContentKind::Track => Ok(Resolution::Leaf(ContainerMember {
            id: id.to_string(),
            is_album: kind == ContentKind::Album,
        })),
        ContentKind::Artist => {
            let filter = reduce_discography.then_some(smart_discography as Filter);
            expand(client, kind, id, "albums", true, filter).await
        }
        ContentKind::Label => expand(client, kind, id, "albums", true, None).await,
        ContentKind::Playlist => expand(client, kind, id, "tracks", false, None).await,
    }
}

type Filter = fn(&Value) -> Value;

async fn expand(
    client: &dyn CatalogClient,
    kind: ContentKind,
    id: &str,
    items_key: &'static str,
    is_album: bool,
    filter: Option<Filter>,
) -> Result<Resolution, ResolutionError> {
    let mut meta = client
        .get_metadata(kind, id)
        .await
        .map_err(|source| ResolutionError::Catalog {
            kind,
            id: id.to_string(),
            source,
        })?;
    if let Some(filter) = filter {
        meta = filter(&meta);
    }

    expansion_from_metadata(kind, id, &meta, items_key, is_album).map(Resolution::Container)
}

/// Reduces artist metadata to one album per title.
///
/// Albums are grouped by their title up to the first bracket, ignoring case.
/// From each group only releases by the artist itself in the group's best
/// bit depth and sampling rate are candidates, and when any release of the
/// group is a remaster only remasters are. The first candidate in catalog
/// order is kept; a group without candidates is dropped. Metadata without an
/// album list is returned unchanged.
pub fn smart_discography(artist: &Value) -> Value {
    let Some(albums) = artist["albums"]["items"].as_array() else {
        return artist.clone();
    };
    let requested = artist["name"].as_str().unwrap_or_default();

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&Value>> = HashMap::new();
    for album in albums {
        let key = title_essence(album["title"].as_str().unwrap_or_default());
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(album);
    }

    let kept: Vec<Value> = order
        .iter()
        .filter_map(|key| best_release(&groups[key], requested))
        .cloned()
        .collect();

    let mut filtered = artist.clone();
    filtered["albums"]["items"] = Value::Array(kept);
    filtered
}

fn best_release<'a>(group: &[&'a Value], requested: &str) -> Option<&'a Value> {
    let bit_depth = |a: &Value| a["maximum_bit_depth"].as_f64().unwrap_or(0.0);
    let sampling_rate = |a: &Value| a["maximum_sampling_rate"].as_f64().unwrap_or(0.0);

    let best_depth = group.iter().map(|a| bit_depth(a)).fold(0.0, f64::max);
    let best_rate = group
        .iter()
        .filter(|a| bit_depth(a) == best_depth)
        .map(|a| sampling_rate(a))
        .fold(0.0, f64::max);
    let has_remaster = group.iter().any(|a| is_remaster(a));

    group
        .iter()
        .find(|a| {
            bit_depth(a) == best_depth
                && sampling_rate(a) == best_rate
                && a["artist"]["name"].as_str() == Some(requested)
                && (!has_remaster || is_remaster(a))
        })
        .copied()
}

fn title_essence(title: &str) -> String {
    title
        .split(['(', '['])
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

fn is_remaster(album: &Value) -> bool {
    let title = album["title"].as_str().unwrap_or_default();
    let version = album["version"].as_str().unwrap_or_default();
    REMASTER.is_match(&format!("{} {}", title, version))
}

/// Builds a [`ContainerExpansion`] from container metadata. Members keep the
/// catalog order; items without an id are dropped and a missing name falls
/// back to the container id.
pub fn expansion_from_metadata(
    kind: ContentKind,
    id: &str,
    meta: &Value,
    items_key: &'static str,
    is_album: bool,
) -> Result<ContainerExpansion, ResolutionError> {
    let items = meta[items_key]["items"]
        .as_array()
        .ok_or_else(|| ResolutionError::MissingItems {
            kind,
            id: id.to_string(),
            key: items_key,
        })?;

    let name = meta["name"]
        .as_str()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(id)
        .to_string();

    let members = items
        .iter()
        .filter_map(|item| utils::value_id(&item["id"]))
        .map(|member_id| ContainerMember {
            id: member_id,
            is_album,
        })
        .collect();

    Ok(ContainerExpansion {
        kind,
        id: id.to_string(),
        name,
        members,
    })
}

/// Creates (or reuses) `base/<sanitized container name>`.
pub async fn prepare_destination(
    base: &Path,
    expansion: &ContainerExpansion,
) -> Result<PathBuf, ResolutionError> {
    let path = base.join(utils::sanitize_filename(&expansion.name));
    async_fs::create_dir_all(&path)
        .await
        .map_err(|source| ResolutionError::Destination {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
