//! # CLI Module
//!
//! User-facing commands of qobuzdl. Each handler receives the already merged
//! [`crate::config::Settings`] (environment plus command line flags), sets up
//! what it needs and reports through the crate log macros.
//!
//! ## Commands
//!
//! - [`download`] - Downloads references, listing files and Last.fm playlists
//! - [`lucky`] - Searches the catalog and downloads the first hits
//! - [`search`] - Prints catalog search results as a table
//! - [`m3u`] - Builds an M3U playlist for an existing directory
//!
//! ## Setup
//!
//! Commands that talk to Qobuz log in first. Commands that download also
//! open the download ledger and install a Ctrl-C handler that cancels the
//! batch: items not yet started are reported as cancelled and a running
//! transfer is abandoned without being recorded.
//!
//! Setup failures (missing credentials, failed login, unreadable ledger) are
//! fatal and exit before anything is downloaded. Everything after that is
//! reported per item and never stops the batch.
//!
//! ```bash
//! qobuzdl dl https://play.qobuz.com/album/0060254735180
//! qobuzdl dl urls.txt -q 27 --embed-art
//! qobuzdl lucky "daft punk discovery" -n 2
//! qobuzdl search "miles davis" -t artist
//! qobuzdl m3u "Qobuz Downloads/My Playlist"
//! ```

mod download;
mod lucky;
mod m3u;
mod search;
mod session;

pub use download::download;
pub use lucky::lucky;
pub use m3u::m3u;
pub use search::search;
