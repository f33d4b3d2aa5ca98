use std::path::PathBuf;

use crate::{error, info, m3u, success, tags::LoftyTagReader};

/// Builds the playlist for an existing directory, no login needed.
pub async fn m3u(directory: PathBuf) {
    if !directory.is_dir() {
        error!("{} is not a directory", directory.display());
    }

    let label = directory.display().to_string();
    let result =
        tokio::task::spawn_blocking(move || m3u::build_m3u(&directory, &LoftyTagReader)).await;

    match result {
        Ok(Ok(Some(path))) => success!("Playlist written to {}", path.display()),
        Ok(Ok(None)) => info!("No readable tracks in {}", label),
        Ok(Err(e)) => error!("Cannot write playlist for {}: {}", label, e),
        Err(e) => error!("Playlist task failed: {}", e),
    }
}
