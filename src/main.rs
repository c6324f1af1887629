use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playtidy::{cli, config, error, reconcile::SortOrder, types::PkceToken};
use tokio::sync::Mutex;

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
    /// Print diagnostic logs (RUST_LOG takes precedence)
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// List your playlists with their current version
    Playlists,

    /// Sort a playlist by album release date
    Sort(SortOptions),

    /// Remove duplicate tracks from a playlist
    Dedupe(DedupeOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SortOptions {
    /// Playlist id, URI or open.spotify.com link
    pub playlist: String,

    /// newest or oldest release first
    #[clap(long, default_value_t = SortOrder::Newest)]
    pub order: SortOrder,

    /// Abort without changes unless the playlist is at this version
    #[clap(long)]
    pub expected_version: Option<String>,

    /// Plan and report only
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DedupeOptions {
    /// Playlist id, URI or open.spotify.com link
    pub playlist: String,

    /// Abort without changes unless the playlist is at this version
    #[clap(long)]
    pub expected_version: Option<String>,

    /// Plan and report only
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Playlists => cli::playlists().await,
        Command::Sort(opt) => {
            cli::sort(opt.playlist, opt.order, opt.expected_version, opt.dry_run).await
        }
        Command::Dedupe(opt) => cli::dedupe(opt.playlist, opt.expected_version, opt.dry_run).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
