mod common;

use common::FakeCatalog;
use qobuzdl::errors::ResolutionError;
use qobuzdl::reference::classify;
use qobuzdl::resolver::{
    Resolution, expansion_from_metadata, prepare_destination, resolve, smart_discography,
};
use qobuzdl::types::{ContainerMember, ContentKind};
use serde_json::json;

#[tokio::test]
async fn test_leaves_resolve_without_catalog_calls() {
    let catalog = FakeCatalog::new();

    let album = resolve(&catalog, &classify("https://play.qobuz.com/album/abc123").unwrap(), false)
        .await
        .unwrap();
    let track = resolve(&catalog, &classify("https://play.qobuz.com/track/42").unwrap(), false)
        .await
        .unwrap();

    assert!(matches!(
        album,
        Resolution::Leaf(ContainerMember { ref id, is_album: true }) if id == "abc123"
    ));
    assert!(matches!(
        track,
        Resolution::Leaf(ContainerMember { ref id, is_album: false }) if id == "42"
    ));
    assert_eq!(*catalog.metadata_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_artist_expands_to_albums() {
    let catalog = FakeCatalog::new().with_metadata(
        ContentKind::Artist,
        "36819",
        json!({
            "name": "Daft Punk",
            "albums": { "items": [ { "id": "a1" }, { "title": "no id" }, { "id": "a2" } ] },
        }),
    );

    let resolution = resolve(&catalog, &classify("https://play.qobuz.com/artist/36819").unwrap(), false)
        .await
        .unwrap();

    let Resolution::Container(expansion) = resolution else {
        panic!("artist should be a container");
    };
    assert_eq!(expansion.kind, ContentKind::Artist);
    assert_eq!(expansion.name, "Daft Punk");
    assert_eq!(
        expansion.members,
        vec![
            ContainerMember {
                id: "a1".to_string(),
                is_album: true
            },
            ContainerMember {
                id: "a2".to_string(),
                is_album: true
            },
        ]
    );
}

#[tokio::test]
async fn test_playlist_expands_to_tracks_with_numeric_ids() {
    let catalog = FakeCatalog::new().with_metadata(
        ContentKind::Playlist,
        "77",
        json!({ "tracks": { "items": [ { "id": 1001 }, { "id": 1002 } ] } }),
    );

    let Resolution::Container(expansion) =
        resolve(&catalog, &classify("https://play.qobuz.com/playlist/77").unwrap(), false)
            .await
            .unwrap()
    else {
        panic!("playlist should be a container");
    };

    // no name in the metadata
    assert_eq!(expansion.name, "77");
    let ids: Vec<&str> = expansion.members.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["1001", "1002"]);
    assert!(expansion.members.iter().all(|m| !m.is_album));
}

#[tokio::test]
async fn test_label_catalog_failure() {
    let catalog = FakeCatalog::new();

    let err = resolve(&catalog, &classify("https://play.qobuz.com/label/9").unwrap(), false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ResolutionError::Catalog {
            kind: ContentKind::Label,
            ..
        }
    ));
}

#[test]
fn test_missing_and_empty_items() {
    let missing = expansion_from_metadata(
        ContentKind::Artist,
        "1",
        &json!({ "name": "Nobody" }),
        "albums",
        true,
    );
    assert!(matches!(
        missing,
        Err(ResolutionError::MissingItems { key: "albums", .. })
    ));

    let empty = expansion_from_metadata(
        ContentKind::Artist,
        "1",
        &json!({ "name": "Nobody", "albums": { "items": [] } }),
        "albums",
        true,
    )
    .unwrap();
    assert!(empty.members.is_empty());
}

#[tokio::test]
async fn test_prepare_destination_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let expansion = expansion_from_metadata(
        ContentKind::Playlist,
        "5",
        &json!({ "name": "Best of: 2024/25", "tracks": { "items": [] } }),
        "tracks",
        false,
    )
    .unwrap();

    let first = prepare_destination(tmp.path(), &expansion).await.unwrap();
    let second = prepare_destination(tmp.path(), &expansion).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, tmp.path().join("Best of_ 2024_25"));
    assert!(first.is_dir());
}

fn discography() -> serde_json::Value {
    let album = |id: &str, title: &str, artist: &str, depth: u64, rate: f64| {
        json!({
            "id": id,
            "title": title,
            "artist": { "name": artist },
            "maximum_bit_depth": depth,
            "maximum_sampling_rate": rate,
        })
    };

    json!({
        "name": "Daft Punk",
        "albums": { "items": [
            album("d16", "Discovery", "Daft Punk", 16, 44.1),
            album("d24", "Discovery", "Daft Punk", 24, 96.0),
            album("ram", "Random Access Memories", "Daft Punk", 24, 88.2),
            album("ram10", "Random Access Memories (10th Anniversary Edition)", "Daft Punk", 24, 88.2),
            album("ha", "Homework", "Daft Punk", 16, 44.1),
            album("hr", "Homework (Remastered)", "Daft Punk", 16, 44.1),
            album("trib", "Tribute", "Other Artist", 24, 192.0),
            { "title": "Untitled", "artist": { "name": "Daft Punk" } },
        ] },
    })
}

#[test]
fn test_smart_discography_keeps_one_release_per_title() {
    let filtered = smart_discography(&discography());

    let ids: Vec<&str> = filtered["albums"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["d24", "ram", "hr"]);
    assert_eq!(filtered["name"], "Daft Punk");

    // nothing to filter
    let bare = json!({ "name": "Nobody" });
    assert_eq!(smart_discography(&bare), bare);
}

#[tokio::test]
async fn test_smart_discography_only_applies_to_artists_when_enabled() {
    let catalog = FakeCatalog::new().with_metadata(ContentKind::Artist, "36819", discography());
    let reference = classify("https://play.qobuz.com/artist/36819").unwrap();

    let members = |resolution: Resolution| match resolution {
        Resolution::Container(expansion) => expansion.members.len(),
        Resolution::Leaf(_) => 0,
    };

    let all = resolve(&catalog, &reference, false).await.unwrap();
    let reduced = resolve(&catalog, &reference, true).await.unwrap();

    assert_eq!(members(all), 7);
    assert_eq!(members(reduced), 3);
}
