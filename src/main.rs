use std::path::PathBuf;

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use qobuzdl::{
    cli,
    config::{self, Settings},
    error,
    types::{Quality, SearchKind},
    utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download URLs, listing files or Last.fm playlists
    Dl(DownloadCommand),

    /// Download the first results of a search
    Lucky(LuckyCommand),

    /// Search the catalog and print the results
    Search(SearchCommand),

    /// Build an M3U playlist for a directory
    M3u(M3uCommand),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct DownloadCommand {
    /// Qobuz URLs, text files with one URL per line, or Last.fm playlist URLs
    #[clap(required = true)]
    pub sources: Vec<String>,

    #[command(flatten)]
    pub options: DownloadOptions,
}

#[derive(Parser, Debug, Clone)]
pub struct LuckyCommand {
    /// Search query
    #[clap(required = true)]
    pub query: Vec<String>,

    /// Type of content to search for (album, track, artist, playlist)
    #[clap(short = 't', long = "type", value_parser = utils::parse_search_kind)]
    pub kind: Option<SearchKind>,

    /// Number of results to download
    #[clap(short = 'n', long)]
    pub number: Option<u32>,

    #[command(flatten)]
    pub options: DownloadOptions,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    /// Search query
    #[clap(required = true)]
    pub query: Vec<String>,

    /// Type of content to search for (album, track, artist, playlist)
    #[clap(
        short = 't',
        long = "type",
        default_value = "album",
        value_parser = utils::parse_search_kind
    )]
    pub kind: SearchKind,

    /// Maximum number of results
    #[clap(short, long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct M3uCommand {
    /// Directory with downloaded tracks
    pub directory: PathBuf,
}

/// Flags shared by every downloading command. Set flags override the
/// environment.
#[derive(Args, Debug, Clone)]
pub struct DownloadOptions {
    /// Directory for downloads
    #[clap(short, long)]
    pub directory: Option<PathBuf>,

    /// Audio quality (5 = MP3, 6 = FLAC, 7 = 24B<96kHz, 27 = 24B>96kHz)
    #[clap(short, long, value_parser = utils::parse_quality)]
    pub quality: Option<Quality>,

    /// Embed the cover into the audio files
    #[clap(long)]
    pub embed_art: bool,

    /// Skip singles and EPs when downloading artists and labels
    #[clap(long)]
    pub albums_only: bool,

    /// Don't create M3U files for playlists
    #[clap(long)]
    pub no_m3u: bool,

    /// Fail instead of accepting a lower quality
    #[clap(long)]
    pub no_fallback: bool,

    /// Download covers in their original quality
    #[clap(long)]
    pub og_cover: bool,

    /// Don't save cover.jpg next to the tracks
    #[clap(long)]
    pub no_cover: bool,

    /// Don't skip or record downloads in the ledger
    #[clap(long)]
    pub no_db: bool,

    /// Number of parallel downloads inside a container
    #[clap(short, long)]
    pub workers: Option<usize>,

    /// Keep one release per title when downloading artists
    #[clap(short, long)]
    pub smart_discography: bool,

    /// Album folder template, e.g. "{artist} - {album} ({year})"
    #[clap(long)]
    pub folder_format: Option<String>,

    /// Track file template, e.g. "{tracknumber}. {tracktitle}"
    #[clap(long)]
    pub track_format: Option<String>,
}

impl DownloadOptions {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(directory) = self.directory {
            settings.directory = directory;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(workers) = self.workers {
            settings.workers = config::clamp_workers(workers);
        }
        settings.embed_art |= self.embed_art;
        settings.ignore_singles_eps |= self.albums_only;
        settings.no_m3u |= self.no_m3u;
        settings.og_cover |= self.og_cover;
        settings.no_cover |= self.no_cover;
        settings.smart_discography |= self.smart_discography;
        if let Some(template) = self.folder_format {
            settings.folder_format = template;
        }
        if let Some(template) = self.track_format {
            settings.track_format = template;
        }
        if self.no_fallback {
            settings.quality_fallback = false;
        }
        if self.no_db {
            settings.downloads_db = None;
        }
        settings
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    match cli.command {
        Command::Dl(opt) => cli::download(opt.options.apply(settings), opt.sources).await,
        Command::Lucky(opt) => {
            cli::lucky(opt.options.apply(settings), opt.query, opt.kind, opt.number).await
        }
        Command::Search(opt) => cli::search(settings, opt.query, opt.kind, opt.limit).await,
        Command::M3u(opt) => cli::m3u(opt.directory).await,
        Command::Completions(_) => {}
    }
}
