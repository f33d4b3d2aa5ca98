mod common;

use std::fs;

use common::{FileTagReader, write_track};
use qobuzdl::m3u::{build_m3u, collect_tracks, render_playlist};
use qobuzdl::tags::{LoftyTagReader, TagReader};
use qobuzdl::types::PlaylistTrackRecord;

#[test]
fn test_unreadable_files_are_left_out() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("Road Trip");

    write_track(&dir.join("01. Intro.flac"), "Intro", "Band", 61);
    write_track(&dir.join("02. Song.mp3"), "Song", "Band", 200);
    write_track(&dir.join("03. Outro.FLAC"), "Outro", "Band", 90);
    fs::write(dir.join("04. Broken.flac"), "garbage").unwrap();
    fs::write(dir.join("cover.jpg"), "jpeg").unwrap();

    let path = build_m3u(&dir, &FileTagReader).unwrap().unwrap();
    assert_eq!(path, dir.join("Road Trip.m3u"));

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "#EXTM3U\n\n\
         #EXTINF:61, Band - Intro\n01. Intro.flac\n\n\
         #EXTINF:200, Band - Song\n02. Song.mp3\n\n\
         #EXTINF:90, Band - Outro\n03. Outro.FLAC"
    );
}

#[test]
fn test_nothing_readable_writes_no_file() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("Empty");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("broken.flac"), "garbage").unwrap();
    fs::write(dir.join("notes.txt"), "a|b|1").unwrap();

    assert_eq!(build_m3u(&dir, &FileTagReader).unwrap(), None);
    assert!(!dir.join("Empty.m3u").exists());
}

#[test]
fn test_nested_folders_use_relative_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("Box Set");

    write_track(&dir.join("CD2").join("01.flac"), "Second", "Band", 10);
    write_track(&dir.join("CD1").join("01.flac"), "First", "Band", 10);
    write_track(&dir.join("bonus.mp3"), "Bonus", "Band", 10);

    let records = collect_tracks(&dir, &FileTagReader);
    let paths: Vec<String> = records.iter().map(|r| r.relative_path.clone()).collect();

    assert_eq!(
        paths,
        vec![
            "bonus.mp3".to_string(),
            format!("CD1{}01.flac", std::path::MAIN_SEPARATOR),
            format!("CD2{}01.flac", std::path::MAIN_SEPARATOR),
        ]
    );
    assert_eq!(records[1].absolute_path, dir.join("CD1").join("01.flac"));
}

#[test]
fn test_render_playlist() {
    let records = vec![PlaylistTrackRecord {
        relative_path: "a.flac".to_string(),
        absolute_path: "/music/a.flac".into(),
        title: "Title".to_string(),
        artist: "Artist".to_string(),
        duration_seconds: 123,
    }];

    assert_eq!(
        render_playlist(&records),
        "#EXTM3U\n\n#EXTINF:123, Artist - Title\na.flac"
    );
    assert_eq!(render_playlist(&[]), "#EXTM3U");
}

#[test]
fn test_lofty_reader_rejects_non_audio() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("fake.flac");
    fs::write(&path, "this is not a flac file").unwrap();

    assert!(LoftyTagReader.read_tags(&path).is_err());
}

#[test]
fn test_sub_directory_with_one_unreadable_file() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("Mix");
    let album = dir.join("Artist - Album");

    for (i, title) in ["One", "Two", "Three"].iter().enumerate() {
        write_track(&album.join(format!("0{}.flac", i + 1)), title, "Artist", 100);
    }
    fs::write(album.join("04.flac"), "no tags here").unwrap();

    let path = build_m3u(&dir, &FileTagReader).unwrap().unwrap();
    let content = fs::read_to_string(path).unwrap();

    assert_eq!(content.matches("#EXTINF:").count(), 3);
    assert!(content.contains(&format!(
        "Artist - Album{}01.flac",
        std::path::MAIN_SEPARATOR
    )));
}
