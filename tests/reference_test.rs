use qobuzdl::errors::ClassificationError;
use qobuzdl::reference::classify;
use qobuzdl::types::{ClassifiedReference, ContentKind};

#[test]
fn test_classify_web_player_urls() {
    let album = classify("https://play.qobuz.com/album/abc123").unwrap();
    assert_eq!(album.kind(), ContentKind::Album);
    assert_eq!(album.id(), "abc123");

    let track = classify("open.qobuz.com/track/52151405").unwrap();
    assert_eq!(track.kind(), ContentKind::Track);
    assert_eq!(track.id(), "52151405");

    let artist = classify("http://www.qobuz.com/artist/36819").unwrap();
    assert_eq!(artist.kind(), ContentKind::Artist);

    let label = classify("https://play.qobuz.com/label/1153").unwrap();
    assert_eq!(label.kind(), ContentKind::Label);
}

#[test]
fn test_classify_store_paths_skip_slug() {
    let reference =
        classify("https://www.qobuz.com/us-en/album/discovery-daft-punk/0724384960650").unwrap();
    assert_eq!(reference.kind(), ContentKind::Album);
    assert_eq!(reference.id(), "0724384960650");

    let hostless = classify("/fr-fr/playlist/some-mix/2039485").unwrap();
    assert_eq!(hostless.kind(), ContentKind::Playlist);
    assert_eq!(hostless.id(), "2039485");
}

#[test]
fn test_classify_ignores_query_and_whitespace() {
    let reference = classify("  https://play.qobuz.com/playlist/123?ref=share#top  ").unwrap();
    assert_eq!(reference.kind(), ContentKind::Playlist);
    assert_eq!(reference.id(), "123");
}

#[test]
fn test_classify_user_favorites_as_playlist() {
    let reference = classify("https://play.qobuz.com/user/library/favorites/98765").unwrap();
    assert_eq!(reference.kind(), ContentKind::Playlist);
    assert_eq!(reference.id(), "98765");
}

#[test]
fn test_classify_unknown_type() {
    let err = classify("https://play.qobuz.com/podcast/123").unwrap_err();
    match err {
        ClassificationError::UnknownType { keyword, .. } => assert_eq!(keyword, "podcast"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_classify_unparseable() {
    let inputs = [
        "",
        "not a url",
        "https://example.com/album/abc123",
        "https://play.qobuz.com/",
        "https://play.qobuz.com/album",
        "https://play.qobuz.com/album/bad%20id",
        "/us-en/album",
    ];

    for input in inputs {
        assert!(
            matches!(classify(input), Err(ClassificationError::Unparseable(_))),
            "expected {:?} to be unparseable",
            input
        );
    }
}

#[test]
fn test_canonical_url() {
    let reference = classify("https://www.qobuz.com/gb-en/album/slug/abc123").unwrap();
    assert_eq!(reference.url(), "https://play.qobuz.com/album/abc123");

    // the canonical form classifies back to the same reference
    assert_eq!(classify(&reference.url()).unwrap(), reference);
}

#[test]
fn test_new_validates_id() {
    assert!(ClassifiedReference::new(ContentKind::Track, "123_abc").is_ok());
    assert!(ClassifiedReference::new(ContentKind::Track, "").is_err());
    assert!(ClassifiedReference::new(ContentKind::Track, "a/b").is_err());
}
