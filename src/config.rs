//! Configuration management for the Qobuz downloader.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Instead of reading variables on demand,
//! everything is collected once into [`Settings`] and [`Credentials`], which
//! are passed explicitly to the components that need them.
//!
//! Precedence:
//! 1. Command line flags (applied by the CLI on top of [`Settings`])
//! 2. Environment variables
//! 3. `.env` file in the local data directory
//! 4. Defaults

use std::{env, path::PathBuf, time::Duration};

use crate::{
    Res,
    errors::ConfigError,
    naming,
    types::{FetchOptions, Quality, SearchKind},
    utils,
};

pub const EMAIL: &str = "QOBUZ_EMAIL";
pub const PASSWORD: &str = "QOBUZ_PASSWORD";
pub const APP_ID: &str = "QOBUZ_APP_ID";
pub const SECRETS: &str = "QOBUZ_SECRETS";
pub const DIRECTORY: &str = "QOBUZ_DL_DIRECTORY";
pub const QUALITY: &str = "QOBUZ_DL_QUALITY";
pub const EMBED_ART: &str = "QOBUZ_DL_EMBED_ART";
pub const LUCKY_LIMIT: &str = "QOBUZ_DL_LUCKY_LIMIT";
pub const LUCKY_TYPE: &str = "QOBUZ_DL_LUCKY_TYPE";
pub const SEARCH_LIMIT: &str = "QOBUZ_DL_SEARCH_LIMIT";
pub const ALBUMS_ONLY: &str = "QOBUZ_DL_ALBUMS_ONLY";
pub const NO_M3U: &str = "QOBUZ_DL_NO_M3U";
pub const NO_FALLBACK: &str = "QOBUZ_DL_NO_FALLBACK";
pub const OG_COVER: &str = "QOBUZ_DL_OG_COVER";
pub const NO_COVER: &str = "QOBUZ_DL_NO_COVER";
pub const DOWNLOADS_DB: &str = "QOBUZ_DL_DOWNLOADS_DB";
pub const NO_DB: &str = "QOBUZ_DL_NO_DB";
pub const WORKERS: &str = "QOBUZ_DL_WORKERS";
pub const TIMEOUT: &str = "QOBUZ_DL_TIMEOUT";
pub const FOLDER_FORMAT: &str = "QOBUZ_DL_FOLDER_FORMAT";
pub const TRACK_FORMAT: &str = "QOBUZ_DL_TRACK_FORMAT";
pub const SMART_DISCOGRAPHY: &str = "QOBUZ_DL_SMART_DISCOGRAPHY";

/// Upper bound for parallel downloads inside one container.
pub const MAX_WORKERS: usize = 32;

/// Platform-specific data directory of the application.
///
/// - Linux: `~/.local/share/qobuzdl`
/// - macOS: `~/Library/Application Support/qobuzdl`
/// - Windows: `%LOCALAPPDATA%/qobuzdl`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("qobuzdl");
    path
}

/// Loads environment variables from the `.env` file in the data directory.
///
/// Creates the data directory if it doesn't exist. A missing `.env` file is
/// not an error; variables may come from the process environment alone.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the `.env` file
/// exists but cannot be parsed.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub app_id: String,
    pub secrets: Vec<String>,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let secrets: Vec<String> = required(SECRETS)?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if secrets.is_empty() {
            return Err(ConfigError::Missing(SECRETS));
        }

        Ok(Self {
            email: required(EMAIL)?,
            password: required(PASSWORD)?,
            app_id: required(APP_ID)?,
            secrets,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub directory: PathBuf,
    pub quality: Quality,
    pub embed_art: bool,
    pub lucky_limit: u32,
    pub lucky_type: SearchKind,
    pub search_limit: u32,
    pub ignore_singles_eps: bool,
    pub no_m3u: bool,
    pub quality_fallback: bool,
    pub og_cover: bool,
    pub no_cover: bool,
    /// Ledger file. `None` disables skip/record behavior entirely.
    pub downloads_db: Option<PathBuf>,
    pub workers: usize,
    pub timeout: Duration,
    /// Template of album folder names, see [`naming`].
    pub folder_format: String,
    /// Template of track file names without extension.
    pub track_format: String,
    /// Reduce artist discographies to one release per title.
    pub smart_discography: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Qobuz Downloads"),
            quality: Quality::Lossless,
            embed_art: false,
            lucky_limit: 1,
            lucky_type: SearchKind::Album,
            search_limit: 20,
            ignore_singles_eps: false,
            no_m3u: false,
            quality_fallback: true,
            og_cover: false,
            no_cover: false,
            downloads_db: Some(data_dir().join("downloads.json")),
            workers: 1,
            timeout: Duration::from_secs(30),
            folder_format: naming::DEFAULT_FOLDER_FORMAT.to_string(),
            track_format: naming::DEFAULT_TRACK_FORMAT.to_string(),
            smart_discography: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, starting from the
    /// defaults. Unset keys keep their default value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(dir) = lookup(DIRECTORY).filter(|v| !v.trim().is_empty()) {
            settings.directory = PathBuf::from(dir);
        }
        if let Some(value) = lookup(QUALITY) {
            settings.quality = utils::parse_quality(&value).map_err(|_| ConfigError::Invalid {
                key: QUALITY,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(LUCKY_TYPE) {
            settings.lucky_type =
                utils::parse_search_kind(&value).map_err(|_| ConfigError::Invalid {
                    key: LUCKY_TYPE,
                    value: value.clone(),
                })?;
        }

        settings.embed_art = flag(&lookup, EMBED_ART, settings.embed_art)?;
        settings.ignore_singles_eps = flag(&lookup, ALBUMS_ONLY, settings.ignore_singles_eps)?;
        settings.no_m3u = flag(&lookup, NO_M3U, settings.no_m3u)?;
        settings.quality_fallback = !flag(&lookup, NO_FALLBACK, !settings.quality_fallback)?;
        settings.og_cover = flag(&lookup, OG_COVER, settings.og_cover)?;
        settings.no_cover = flag(&lookup, NO_COVER, settings.no_cover)?;
        settings.smart_discography =
            flag(&lookup, SMART_DISCOGRAPHY, settings.smart_discography)?;

        if let Some(template) = lookup(FOLDER_FORMAT).filter(|v| !v.trim().is_empty()) {
            settings.folder_format = template;
        }
        if let Some(template) = lookup(TRACK_FORMAT).filter(|v| !v.trim().is_empty()) {
            settings.track_format = template;
        }

        settings.lucky_limit = number(&lookup, LUCKY_LIMIT, settings.lucky_limit)?;
        settings.search_limit = number(&lookup, SEARCH_LIMIT, settings.search_limit)?;
        settings.workers = clamp_workers(number(&lookup, WORKERS, settings.workers)?);
        settings.timeout = Duration::from_secs(number(&lookup, TIMEOUT, 30u64)?.max(1));

        if let Some(path) = lookup(DOWNLOADS_DB).filter(|v| !v.trim().is_empty()) {
            settings.downloads_db = Some(PathBuf::from(path));
        }
        if flag(&lookup, NO_DB, false)? {
            settings.downloads_db = None;
        }

        Ok(settings)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            quality_fallback: self.quality_fallback,
            embed_art: self.embed_art,
            og_cover: self.og_cover,
            no_cover: self.no_cover,
            ignore_singles_eps: self.ignore_singles_eps,
            folder_format: self.folder_format.clone(),
            track_format: self.track_format.clone(),
        }
    }
}

/// Keeps a requested worker count within `1..=MAX_WORKERS`.
pub fn clamp_workers(workers: usize) -> usize {
    workers.clamp(1, MAX_WORKERS)
}

fn flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => utils::parse_flag(&value).ok_or(ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn number<F, N>(lookup: &F, key: &'static str, default: N) -> Result<N, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    N: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<N>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
