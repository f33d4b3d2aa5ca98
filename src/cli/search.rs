use tabled::Table;

use crate::{
    config::Settings,
    types::{SearchKind, SearchTableRow},
    warning,
};

use super::session;

pub async fn search(settings: Settings, query: Vec<String>, kind: SearchKind, limit: Option<u32>) {
    let query = query.join(" ");
    let client = session::login(&settings).await;

    let results = crate::search::search(
        &client,
        &query,
        kind,
        limit.unwrap_or(settings.search_limit),
    )
    .await;

    if results.is_empty() {
        warning!("No {} found for \"{}\"", kind, query);
        return;
    }

    let rows: Vec<SearchTableRow> = results
        .into_iter()
        .enumerate()
        .map(|(i, r)| SearchTableRow {
            index: i + 1,
            result: r.text,
            url: r.url,
        })
        .collect();

    println!("{}", Table::new(rows));
}
