use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::{Credentials, Settings},
    download::Downloader,
    error, info,
    management::{DownloadLedger, LedgerManager},
    qobuz::QobuzClient,
    tags::LoftyTagReader,
    warning,
};

/// Logs in with the credentials from the environment. Exits on failure.
pub(super) async fn login(settings: &Settings) -> QobuzClient {
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_message("Logging in to Qobuz...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let result = QobuzClient::login(&credentials, settings.timeout).await;
    pb.finish_and_clear();

    match result {
        Ok(client) => client,
        Err(e) => error!("Cannot log in to Qobuz: {}", e),
    }
}

/// Builds a [`Downloader`] with the Qobuz client, the ledger and a Ctrl-C
/// handler wired to its cancellation token.
pub(super) async fn downloader(settings: Settings) -> Downloader {
    let client = login(&settings).await;

    let ledger: Option<Arc<dyn DownloadLedger>> = match &settings.downloads_db {
        Some(path) => match LedgerManager::open(path.clone()).await {
            Ok(ledger) => {
                info!(
                    "Using download ledger {} ({} entries)",
                    ledger.path().display(),
                    ledger.count().await
                );
                Some(Arc::new(ledger) as Arc<dyn DownloadLedger>)
            }
            Err(e) => error!("Cannot open download ledger {}: {}", path.display(), e),
        },
        None => {
            info!("Download ledger disabled, nothing will be skipped");
            None
        }
    };

    let downloader = Downloader::new(
        Arc::new(client),
        ledger,
        Arc::new(LoftyTagReader),
        settings,
    );

    let token = downloader.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warning!("Interrupted, stopping after the current step...");
            token.cancel();
        }
    });

    downloader
}
