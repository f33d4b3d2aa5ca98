use crate::{config::Settings, info};

use super::session;

pub async fn download(settings: Settings, sources: Vec<String>) {
    info!(
        "Downloading into {} at {}",
        settings.directory.display(),
        settings.quality
    );

    let downloader = session::downloader(settings).await;
    downloader.download_many(&sources).await;
}
