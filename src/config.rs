//! Configuration management for playtidy.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Variables already present in the process
//! environment take precedence over the file. Everything except the client id
//! has a default pointing at Spotify's public endpoints.

use std::{env, path::PathBuf};

use crate::{
    Res,
    reconcile::{DEFAULT_PAGE_SIZE, DEFAULT_PREVIEW_LEN},
};

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_SCOPE: &str =
    "playlist-read-private playlist-read-collaborative playlist-modify-public playlist-modify-private";

/// Directory holding the `.env` file and the token cache.
///
/// - Linux: `~/.local/share/playtidy`
/// - macOS: `~/Library/Application Support/playtidy`
/// - Windows: `%LOCALAPPDATA%/playtidy`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playtidy");
    path
}

/// Loads `<data_dir>/.env` into the process environment.
///
/// Creates the data directory when needed. A missing `.env` file is not an
/// error, since every value can also come from the environment directly.
///
/// # Example
///
/// ```
/// use playtidy::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Res<()> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)?;
    Ok(())
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn usize_or(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Address the local OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Client id of the registered Spotify application
/// (`SPOTIFY_API_AUTH_CLIENT_ID`). Required for login and token refresh.
pub fn spotify_client_id() -> Result<String, String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .map_err(|_| "SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string())
}

/// Must match a redirect URI registered for the application
/// (`SPOTIFY_API_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Tracks per page when reading a playlist (`PLAYTIDY_PAGE_SIZE`), 1 to 100.
pub fn page_size() -> usize {
    usize_or("PLAYTIDY_PAGE_SIZE", DEFAULT_PAGE_SIZE).clamp(1, DEFAULT_PAGE_SIZE)
}

/// Tracks shown after a sort (`PLAYTIDY_PREVIEW_TRACKS`).
pub fn preview_tracks() -> usize {
    usize_or("PLAYTIDY_PREVIEW_TRACKS", DEFAULT_PREVIEW_LEN)
}
