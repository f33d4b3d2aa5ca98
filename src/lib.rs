//! Qobuz Downloader CLI Library
//!
//! This library resolves Qobuz content references (albums, tracks, artists,
//! labels, playlists and scraped Last.fm playlist pages) into downloadable
//! items, downloads them while keeping track of what was already fetched, and
//! assembles M3U playlists from the downloaded files.
//!
//! # Modules
//!
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `download` - Batch orchestration of downloads
//! - `errors` - Error taxonomy shared by all components
//! - `format` - Partial template rendering for search results
//! - `lastfm` - Last.fm playlist importer
//! - `m3u` - M3U playlist assembly from a download directory
//! - `management` - Persistent download ledger
//! - `naming` - Album folder and track file name templates
//! - `qobuz` - Catalog client contract and the Qobuz API implementation
//! - `reference` - Content reference classification
//! - `resolver` - Leaf/container resolution
//! - `search` - Catalog search and lucky mode
//! - `tags` - Audio tag reading and writing
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use qobuzdl::{config, reference};
//!
//! #[tokio::main]
//! async fn main() -> qobuzdl::Res<()> {
//!     config::load_env().await?;
//!     let reference = reference::classify("https://play.qobuz.com/album/abc123")?;
//!     println!("{}", reference.url());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod download;
pub mod errors;
pub mod format;
pub mod lastfm;
pub mod m3u;
pub mod management;
pub mod naming;
pub mod qobuz;
pub mod reference;
pub mod resolver;
pub mod search;
pub mod tags;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the binary glue where errors of different domains meet. Library
/// components return their own error types from [`errors`].
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Resolving {} references", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal conditions that occur before any download starts, such as
/// an unusable configuration or a failed login. Per-item failures go through
/// [`warning!`] so the batch keeps going.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for every recoverable failure: a malformed reference, an
/// unresolvable container, a failed transfer or an aborted import.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
