use serde_json::Value;

use crate::{
    format,
    qobuz::CatalogClient,
    reference::WEB_URL,
    types::{SearchKind, SearchResult},
    utils, warning,
};

pub const MIN_QUERY_LEN: usize = 3;

struct SearchTemplate {
    results_key: &'static str,
    template: &'static str,
    /// Albums and tracks get duration and quality appended.
    requires_extra: bool,
}

fn template_for(kind: SearchKind) -> SearchTemplate {
    match kind {
        SearchKind::Album => SearchTemplate {
            results_key: "albums",
            template: "{artist[name]} - {title}",
            requires_extra: true,
        },
        SearchKind::Track => SearchTemplate {
            results_key: "tracks",
            template: "{performer[name]} - {title}",
            requires_extra: true,
        },
        SearchKind::Artist => SearchTemplate {
            results_key: "artists",
            template: "{name} - ({albums_count} releases)",
            requires_extra: false,
        },
        SearchKind::Playlist => SearchTemplate {
            results_key: "playlists",
            template: "{name} - ({tracks_count} releases)",
            requires_extra: false,
        },
    }
}

/// Searches the catalog and renders every hit as a display line plus its
/// canonical URL. Hits without an id have no URL and are left out. Returns an
/// empty list (and logs why) when the query is too short, the request fails
/// or the response has no result list.
pub async fn search(
    client: &dyn CatalogClient,
    query: &str,
    kind: SearchKind,
    limit: u32,
) -> Vec<SearchResult> {
    fetch_hits(client, query, kind, limit)
        .await
        .iter()
        .filter_map(|hit| {
            Some(SearchResult {
                url: hit_url(kind, hit)?,
                text: render_hit(kind, hit),
            })
        })
        .collect()
}

/// Lucky mode: canonical URLs of the first `limit` hits, ready to be handed
/// to the downloader. Hits without an id are dropped.
pub async fn lucky(
    client: &dyn CatalogClient,
    query: &str,
    kind: SearchKind,
    limit: u32,
) -> Vec<String> {
    fetch_hits(client, query, kind, limit)
        .await
        .iter()
        .filter_map(|hit| hit_url(kind, hit))
        .take(limit as usize)
        .collect()
}

pub fn render_hit(kind: SearchKind, hit: &Value) -> String {
    let template = template_for(kind);
    let text = format::render(template.template, hit);

    if !template.requires_extra {
        return text;
    }

    let quality = if hit["hires_streamable"].as_bool().unwrap_or(false) {
        "HI-RES"
    } else {
        "LOSSLESS"
    };
    format!(
        "{} - {} [{}]",
        text,
        format::render("{duration:hms}", hit),
        quality
    )
}

fn hit_url(kind: SearchKind, hit: &Value) -> Option<String> {
    utils::value_id(&hit["id"]).map(|id| format!("{WEB_URL}{kind}/{id}"))
}

async fn fetch_hits(
    client: &dyn CatalogClient,
    query: &str,
    kind: SearchKind,
    limit: u32,
) -> Vec<Value> {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        warning!("Your search query is too short or invalid");
        return Vec::new();
    }

    let results_key = template_for(kind).results_key;
    match client.search(kind, query, limit).await {
        Ok(response) => match response[results_key]["items"].as_array() {
            Some(items) => items.clone(),
            None => {
                warning!("Unexpected search response for {}s", kind);
                Vec::new()
            }
        },
        Err(e) => {
            warning!("Search for \"{}\" failed: {}", query, e);
            Vec::new()
        }
    }
}
