mod common;

use common::FakeCatalog;
use qobuzdl::search::{lucky, render_hit, search};
use qobuzdl::types::SearchKind;
use serde_json::json;

#[test]
fn test_render_album_hit() {
    let hit = json!({
        "id": "0724384960650",
        "title": "Discovery",
        "artist": { "name": "Daft Punk" },
        "duration": 3663,
        "hires_streamable": true,
    });

    assert_eq!(
        render_hit(SearchKind::Album, &hit),
        "Daft Punk - Discovery - 01:01:03 [HI-RES]"
    );
}

#[test]
fn test_render_track_hit() {
    let hit = json!({
        "id": 52151405,
        "title": "One More Time",
        "performer": { "name": "Daft Punk" },
        "duration": 320,
        "hires_streamable": false,
    });

    assert_eq!(
        render_hit(SearchKind::Track, &hit),
        "Daft Punk - One More Time - 00:05:20 [LOSSLESS]"
    );
}

#[test]
fn test_render_artist_and_playlist_hits() {
    let artist = json!({ "id": 36819, "name": "Daft Punk", "albums_count": 42 });
    assert_eq!(
        render_hit(SearchKind::Artist, &artist),
        "Daft Punk - (42 releases)"
    );

    let playlist = json!({ "id": 1, "name": "Chill" });
    assert_eq!(
        render_hit(SearchKind::Playlist, &playlist),
        "Chill - (n/a releases)"
    );
}

#[tokio::test]
async fn test_search_builds_urls_and_drops_hits_without_id() {
    let catalog = FakeCatalog::new().with_search(
        "daft punk",
        json!({ "artists": { "items": [
            { "id": 36819, "name": "Daft Punk", "albums_count": 42 },
            { "name": "No Id" },
            { "id": "", "name": "Blank Id" },
            { "id": 27, "name": "Thomas Bangalter" },
        ] } }),
    );

    let results = search(&catalog, "daft punk", SearchKind::Artist, 10).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text, "Daft Punk - (42 releases)");
    assert_eq!(results[0].url, "https://play.qobuz.com/artist/36819");
    assert_eq!(results[1].url, "https://play.qobuz.com/artist/27");
    assert!(results.iter().all(|r| !r.url.ends_with("/artist/")));
    assert_eq!(
        catalog.search_calls.lock().unwrap()[0],
        (SearchKind::Artist, "daft punk".to_string(), 10)
    );
}

#[tokio::test]
async fn test_search_short_query_makes_no_request() {
    let catalog = FakeCatalog::new();

    assert!(search(&catalog, " ab ", SearchKind::Album, 10).await.is_empty());
    assert!(lucky(&catalog, "ab", SearchKind::Album, 1).await.is_empty());
    assert!(catalog.search_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_failures_give_empty_results() {
    let catalog =
        FakeCatalog::new().with_search("odd response", json!({ "albums": { "total": 0 } }));

    assert!(search(&catalog, "unknown query", SearchKind::Album, 5).await.is_empty());
    assert!(search(&catalog, "odd response", SearchKind::Album, 5).await.is_empty());
}

#[tokio::test]
async fn test_lucky_returns_first_urls_with_ids() {
    let catalog = FakeCatalog::new().with_search(
        "discovery",
        json!({ "albums": { "items": [
            { "id": "first", "title": "A" },
            { "title": "no id" },
            { "id": "second", "title": "B" },
            { "id": "third", "title": "C" },
        ] } }),
    );

    let urls = lucky(&catalog, "discovery", SearchKind::Album, 2).await;

    assert_eq!(
        urls,
        vec![
            "https://play.qobuz.com/album/first".to_string(),
            "https://play.qobuz.com/album/second".to_string(),
        ]
    );
}

#[test]
fn test_render_hit_without_duration() {
    let hit = json!({
        "id": "x",
        "title": "Untimed",
        "artist": { "name": "Somebody" },
    });

    assert_eq!(
        render_hit(SearchKind::Album, &hit),
        "Somebody - Untimed - n/a [LOSSLESS]"
    );
}
