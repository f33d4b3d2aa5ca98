use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tokio::{io::AsyncWriteExt, time::timeout};

use crate::{
    errors::FetchError,
    info, naming,
    tags::{self, TrackMetadata},
    types::{ContentKind, DownloadTask, FetchOptions, Quality},
    utils, warning,
};

use super::{CatalogClient, QobuzClient};

struct AlbumInfo<'a> {
    meta: &'a Value,
    title: String,
    artist: String,
}

impl<'a> AlbumInfo<'a> {
    fn from_value(meta: &'a Value) -> Self {
        Self {
            meta,
            title: naming::album_title(meta).to_string(),
            artist: naming::album_artist(meta).to_string(),
        }
    }

    fn folder_name(&self, options: &FetchOptions) -> String {
        naming::album_folder_name(&options.folder_format, self.meta)
    }
}

pub(super) async fn fetch(
    client: &QobuzClient,
    task: &DownloadTask,
    options: &FetchOptions,
) -> Result<(), FetchError> {
    if task.is_album {
        download_album(client, task, options).await
    } else {
        download_track(client, task, options).await
    }
}

async fn download_album(
    client: &QobuzClient,
    task: &DownloadTask,
    options: &FetchOptions,
) -> Result<(), FetchError> {
    let meta = client.get_metadata(ContentKind::Album, &task.id).await?;
    let album = AlbumInfo::from_value(&meta);

    if options.ignore_singles_eps
        && meta["release_type"]
            .as_str()
            .is_some_and(|release_type| release_type != "album")
    {
        info!("Skipping single/EP: {} - {}", album.artist, album.title);
        return Ok(());
    }

    if !meta["streamable"].as_bool().unwrap_or(false) {
        return Err(FetchError::NonStreamable(format!(
            "album '{}' is not streamable",
            album.title
        )));
    }

    let dir = task.destination.join(album.folder_name(options));
    async_fs::create_dir_all(&dir).await?;
    let cover = fetch_cover(client, &meta, &dir, options).await;

    let tracks = meta["tracks"]["items"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    info!(
        "Downloading {} - {} ({} tracks) [{}]",
        album.artist,
        album.title,
        tracks.len(),
        task.quality
    );

    let mut transient: Option<FetchError> = None;
    let mut completed = 0;
    for (index, track) in tracks.iter().enumerate() {
        let position = u32::try_from(index + 1).unwrap_or(u32::MAX);
        match download_track_file(
            client,
            track,
            &album,
            &dir,
            task.quality,
            options,
            cover.as_deref(),
            position,
        )
        .await
        {
            Ok(()) => completed += 1,
            Err(FetchError::NonStreamable(reason)) => warning!("Skipping track: {}", reason),
            Err(e) => {
                warning!("Track {} of '{}' failed: {}", position, album.title, e);
                transient.get_or_insert(e);
            }
        }
    }

    // a transient failure leaves the album unrecorded so a re-run completes it
    if let Some(e) = transient {
        return Err(e);
    }
    if completed == 0 {
        return Err(FetchError::NonStreamable(format!(
            "no track of '{}' could be downloaded",
            album.title
        )));
    }
    Ok(())
}

async fn download_track(
    client: &QobuzClient,
    task: &DownloadTask,
    options: &FetchOptions,
) -> Result<(), FetchError> {
    let meta = client.get_metadata(ContentKind::Track, &task.id).await?;
    let album = AlbumInfo::from_value(&meta["album"]);

    let dir = task.destination.join(album.folder_name(options));
    async_fs::create_dir_all(&dir).await?;
    let cover = fetch_cover(client, &meta["album"], &dir, options).await;

    download_track_file(
        client,
        &meta,
        &album,
        &dir,
        task.quality,
        options,
        cover.as_deref(),
        1,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn download_track_file(
    client: &QobuzClient,
    track: &Value,
    album: &AlbumInfo<'_>,
    dir: &Path,
    quality: Quality,
    options: &FetchOptions,
    cover: Option<&[u8]>,
    position: u32,
) -> Result<(), FetchError> {
    let id = utils::value_id(&track["id"])
        .ok_or_else(|| FetchError::NonStreamable("track without id".to_string()))?;

    let title = naming::track_title(track);
    let artist = track["performer"]["name"]
        .as_str()
        .unwrap_or(&album.artist)
        .to_string();
    let number = track["track_number"]
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(position);

    let file = client.file_url(&id, quality).await?;
    let url = match file["url"].as_str() {
        Some(url) if !file["sample"].as_bool().unwrap_or(false) => url.to_string(),
        _ => {
            return Err(FetchError::NonStreamable(format!(
                "'{}' is not available for streaming",
                title
            )));
        }
    };

    let delivered = file["format_id"]
        .as_u64()
        .and_then(|f| u32::try_from(f).ok())
        .and_then(Quality::from_format_id)
        .unwrap_or(quality);
    if delivered != quality && !options.quality_fallback {
        return Err(FetchError::NonStreamable(format!(
            "'{}' is not available in {}",
            title, quality
        )));
    }

    let path = dir.join(format!(
        "{}.{}",
        naming::track_file_stem(&options.track_format, track, album.meta, number),
        delivered.extension()
    ));
    if path.exists() {
        info!("Already on disk: {}", path.display());
        return Ok(());
    }

    stream_to_file(client, &url, &path, &title).await?;

    let tag_path = path.clone();
    let album_title = album.title.clone();
    let embedded = if options.embed_art {
        cover.map(<[u8]>::to_vec)
    } else {
        None
    };
    let tagged = tokio::task::spawn_blocking(move || {
        tags::write_tags(
            &tag_path,
            &TrackMetadata {
                title: &title,
                artist: &artist,
                album: &album_title,
                track_number: Some(number),
                cover: embedded.as_deref(),
            },
        )
    })
    .await;

    match tagged {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warning!("Cannot tag {}: {}", path.display(), e),
        Err(e) => warning!("Tagging task failed for {}: {}", path.display(), e),
    }
    Ok(())
}

async fn stream_to_file(
    client: &QobuzClient,
    url: &str,
    path: &Path,
    label: &str,
) -> Result<(), FetchError> {
    let part = part_path(path);
    let pb = ProgressBar::new_spinner();

    let result = async {
        let mut response = client.transfer.get(url).send().await?.error_for_status()?;

        if let Some(len) = response.content_length() {
            pb.set_length(len);
            pb.set_style(
                ProgressStyle::with_template("{msg:30!} [{bar:30.blue}] {bytes}/{total_bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
        }
        pb.set_message(label.to_string());

        let mut file = tokio::fs::File::create(&part).await?;
        loop {
            let chunk = timeout(client.chunk_timeout, response.chunk())
                .await
                .map_err(|_| FetchError::Transient(format!("transfer of '{}' stalled", label)))??;

            match chunk {
                Some(bytes) => {
                    file.write_all(&bytes).await?;
                    pb.inc(bytes.len() as u64);
                }
                None => break,
            }
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&part, path).await?;
        Ok::<(), FetchError>(())
    }
    .await;

    pb.finish_and_clear();
    if result.is_err() {
        let _ = tokio::fs::remove_file(&part).await;
    }
    result
}

/// Downloads the album cover. Writes `cover.jpg` unless covers are disabled,
/// and returns the bytes when they should be embedded into the tracks.
async fn fetch_cover(
    client: &QobuzClient,
    album: &Value,
    dir: &Path,
    options: &FetchOptions,
) -> Option<Vec<u8>> {
    if options.no_cover && !options.embed_art {
        return None;
    }

    let mut url = album["image"]["large"].as_str()?.to_string();
    if options.og_cover {
        url = url.replace("_600.", "_org.");
    }

    let request = async {
        client
            .transfer
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await
            .map(|b| b.to_vec())
    };

    let bytes = match timeout(client.chunk_timeout.max(Duration::from_secs(30)), request).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warning!("Cannot download cover: {}", e);
            return None;
        }
        Err(_) => {
            warning!("Cover download timed out");
            return None;
        }
    };

    if !options.no_cover {
        let cover_path: PathBuf = dir.join("cover.jpg");
        if !cover_path.exists() {
            if let Err(e) = async_fs::write(&cover_path, &bytes).await {
                warning!("Cannot write {}: {}", cover_path.display(), e);
            }
        }
    }

    options.embed_art.then_some(bytes)
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
