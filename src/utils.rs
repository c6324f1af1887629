use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use url::Url;

/// Length of a Spotify base62 id.
const SPOTIFY_ID_LEN: usize = 22;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

fn is_spotify_id(candidate: &str) -> bool {
    candidate.len() == SPOTIFY_ID_LEN && candidate.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Extracts a playlist id from user input.
///
/// Accepts a bare id, a `spotify:playlist:<id>` URI or an
/// `https://open.spotify.com/playlist/<id>` link (query string and locale
/// prefixes such as `/intl-de/` are ignored).
pub fn parse_playlist_id(input: &str) -> Result<String, String> {
    let input = input.trim();

    if is_spotify_id(input) {
        return Ok(input.to_string());
    }

    if let Some(id) = input.strip_prefix("spotify:playlist:") {
        if is_spotify_id(id) {
            return Ok(id.to_string());
        }
        return Err(format!("'{}' is not a valid playlist URI", input));
    }

    let url = Url::parse(input).map_err(|_| format!("'{}' is not a playlist id or link", input))?;
    if url.host_str() != Some("open.spotify.com") {
        return Err(format!("'{}' is not an open.spotify.com link", input));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    segments
        .windows(2)
        .find(|pair| pair[0] == "playlist")
        .map(|pair| pair[1])
        .filter(|id| is_spotify_id(id))
        .map(str::to_string)
        .ok_or_else(|| format!("'{}' does not point to a playlist", input))
}

/// Artist names as shown in tables.
pub fn join_artists(artists: &[String]) -> String {
    if artists.is_empty() {
        return "-".to_string();
    }
    artists.join(", ")
}

/// Cuts `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
