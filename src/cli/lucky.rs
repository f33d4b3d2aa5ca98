use crate::{config::Settings, info, search, types::SearchKind, warning};

use super::session;

/// Downloads the first `limit` hits of a catalog search.
pub async fn lucky(
    settings: Settings,
    query: Vec<String>,
    kind: Option<SearchKind>,
    limit: Option<u32>,
) {
    let query = query.join(" ");
    let kind = kind.unwrap_or(settings.lucky_type);
    let limit = limit.unwrap_or(settings.lucky_limit);

    let downloader = session::downloader(settings).await;
    let urls = search::lucky(downloader.client(), &query, kind, limit).await;

    if urls.is_empty() {
        warning!("No {} found for \"{}\"", kind, query);
        return;
    }

    info!("Found {} {} result(s) for \"{}\"", urls.len(), kind, query);
    downloader.download_many(&urls).await;
}
