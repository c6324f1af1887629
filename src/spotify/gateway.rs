use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};
use reqwest::{
    StatusCode,
    blocking::{Client, RequestBuilder},
};
use serde::de::DeserializeOwned;

use crate::{
    config,
    management::TokenManager,
    reconcile::{GatewayError, Page, PlaylistGateway, ReleaseDate, Track},
    types::{
        PlaylistItem, PlaylistItemsResponse, PlaylistMeta, RemoveTracksRequest,
        ReorderTracksRequest, SnapshotResponse, TrackOccurrence,
    },
};

use super::rate_limit::{RateLimiter, RetryDecision};

/// Fields requested for playlist metadata.
const META_FIELDS: &str = "name,snapshot_id,tracks.total";

/// Fields requested per playlist item.
const ITEM_FIELDS: &str = "total,items(added_at,track(uri,name,artists(name),album(name,release_date,release_date_precision)))";

/// Largest page the items endpoint accepts.
const MAX_PAGE_SIZE: usize = 100;

/// Per-request network timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether a request mutates the playlist. A 400 on a mutation means the
/// positions or snapshot we sent no longer match the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
}

/// A failed HTTP attempt, before it is mapped onto a [`GatewayError`].
#[derive(Debug)]
pub(crate) struct HttpFailure {
    status: Option<StatusCode>,
    retry_after: Option<Duration>,
    transient: bool,
    message: String,
}

impl HttpFailure {
    fn transport(err: reqwest::Error) -> Self {
        Self {
            status: None,
            retry_after: None,
            transient: err.is_timeout() || err.is_connect(),
            message: err.to_string(),
        }
    }

    fn auth(message: String) -> Self {
        Self {
            status: Some(StatusCode::UNAUTHORIZED),
            retry_after: None,
            transient: false,
            message,
        }
    }

    fn decode(err: reqwest::Error) -> Self {
        Self {
            status: None,
            retry_after: None,
            transient: false,
            message: format!("unexpected response body: {}", err),
        }
    }

    fn retry_decision(&self) -> RetryDecision {
        match self.status {
            Some(StatusCode::TOO_MANY_REQUESTS) => RetryDecision::Retry {
                retry_after: self.retry_after,
            },
            Some(
                StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT,
            ) => RetryDecision::Retry { retry_after: None },
            None if self.transient => RetryDecision::Retry { retry_after: None },
            _ => RetryDecision::GiveUp,
        }
    }

    fn into_gateway_error(self, access: Access) -> GatewayError {
        match self.status {
            Some(StatusCode::NOT_FOUND) => GatewayError::NotFound,
            Some(StatusCode::UNAUTHORIZED) => GatewayError::Forbidden(format!(
                "session is not authorized, run `playtidy auth` ({})",
                self.message
            )),
            Some(StatusCode::FORBIDDEN) => GatewayError::Forbidden(self.message),
            Some(StatusCode::BAD_REQUEST) if access == Access::Write => {
                GatewayError::Conflict(self.message)
            }
            _ => GatewayError::Unavailable(self.message),
        }
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// [`PlaylistGateway`] backed by the Spotify Web API.
///
/// Requests block the calling thread. Every request is paced and retried by
/// the shared [`RateLimiter`] and authorized with a token from the
/// [`TokenManager`], which refreshes it when it is about to expire.
pub struct SpotifyGateway {
    client: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
    limiter: Arc<RateLimiter>,
}

impl SpotifyGateway {
    pub fn new(api_url: String, tokens: TokenManager, limiter: Arc<RateLimiter>) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| e.to_string())?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
            limiter,
        })
    }

    /// Gateway using the stored login, the configured API URL and the
    /// process-wide rate limiter.
    ///
    /// Must not be called from inside an async runtime thread, since the
    /// blocking HTTP client spins up its own.
    pub fn from_env() -> Result<Self, String> {
        let tokens = TokenManager::load()
            .map_err(|e| format!("no stored login, run `playtidy auth` first ({})", e))?;
        Self::new(config::spotify_apiurl(), tokens, RateLimiter::shared())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn bearer(&self) -> Result<String, HttpFailure> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| HttpFailure::auth("token store is unusable".to_string()))?;
        Ok(tokens.get_valid_token())
    }

    /// Sends a request built by `build` and decodes the JSON answer.
    pub(crate) fn send<T, B>(&self, access: Access, build: B) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Fn(&Client) -> RequestBuilder,
    {
        self.limiter
            .execute(
                || {
                    let token = self.bearer()?;
                    let response = build(&self.client)
                        .bearer_auth(token)
                        .send()
                        .map_err(HttpFailure::transport)?;

                    let status = response.status();
                    if status.is_success() {
                        return response.json::<T>().map_err(HttpFailure::decode);
                    }

                    let retry_after = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<u64>().ok())
                        .map(Duration::from_secs);
                    let message = response
                        .text()
                        .ok()
                        .and_then(|body| error_message(&body))
                        .unwrap_or_else(|| {
                            status.canonical_reason().unwrap_or("request failed").to_string()
                        });

                    Err(HttpFailure {
                        status: Some(status),
                        retry_after,
                        transient: false,
                        message,
                    })
                },
                HttpFailure::retry_decision,
            )
            .map_err(|failure| failure.into_gateway_error(access))
    }
}

/// Pulls `error.message` out of a Spotify error body.
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error_description"].as_str())
        .map(str::to_string)
}

fn to_track(item: PlaylistItem, position: usize) -> Track {
    let added_at = item
        .added_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc));

    match item.track {
        Some(track) => {
            let (album, release_date) = match track.album {
                Some(album) => {
                    let date = album.release_date.as_deref().and_then(|raw| {
                        ReleaseDate::parse(raw, album.release_date_precision.as_deref())
                    });
                    (album.name, date)
                }
                None => (String::new(), None),
            };

            Track {
                track_id: track.uri,
                title: track.name,
                artists: track.artists.into_iter().map(|a| a.name).collect(),
                album,
                release_date,
                added_at,
                position,
            }
        }
        None => Track {
            track_id: String::new(),
            title: String::new(),
            artists: Vec::new(),
            album: String::new(),
            release_date: None,
            added_at,
            position,
        },
    }
}

impl SpotifyGateway {
    fn fetch_meta(&self, playlist_id: &str) -> Result<PlaylistMeta, GatewayError> {
        let url = self.url(&format!("/playlists/{}", playlist_id));
        self.send(Access::Read, |client| {
            client.get(&url).query(&[("fields", META_FIELDS)])
        })
    }
}

/// Pairs a page of items with the metadata read before and after it.
///
/// The items are only known to belong to `before.snapshot_id` when the
/// playlist reports the same snapshot on both sides of the items request.
/// Anything else is a [`GatewayError::Conflict`], which a snapshot read
/// treats as an edit in progress.
fn bracketed_page(
    before: PlaylistMeta,
    items: PlaylistItemsResponse,
    after: &PlaylistMeta,
    offset: usize,
) -> Result<Page, GatewayError> {
    if after.snapshot_id != before.snapshot_id {
        return Err(GatewayError::Conflict(format!(
            "playlist changed while a page was read: snapshot {} became {}",
            before.snapshot_id, after.snapshot_id
        )));
    }
    if items.total != before.tracks.total || after.tracks.total != before.tracks.total {
        return Err(GatewayError::Conflict(format!(
            "playlist changed between reads: {} tracks in metadata, {} in items",
            before.tracks.total, items.total
        )));
    }

    Ok(Page {
        playlist_name: before.name,
        tracks: items
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| to_track(item, offset + i))
            .collect(),
        total: items.total,
        version: before.snapshot_id,
    })
}

impl PlaylistGateway for SpotifyGateway {
    /// Reads one page of items together with the playlist's snapshot.
    ///
    /// Spotify only reports `snapshot_id` on the playlist object, so the
    /// items request is bracketed by two metadata requests and every page
    /// costs three requests.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Spotify playlist id
    /// * `offset` - Position of the first item to return
    /// * `limit` - Page size, clamped to `1..=100`
    ///
    /// # Returns
    ///
    /// The page with positions counted from the start of the playlist. A
    /// snapshot or total that differs between the three requests yields
    /// [`GatewayError::Conflict`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// let page = gateway.fetch_page("37i9dQZF1DXcBWIGoYBM5M", 0, 100)?;
    /// println!("{} of {} tracks at {}", page.tracks.len(), page.total, page.version);
    /// ```
    fn fetch_page(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page, GatewayError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);

        let before = self.fetch_meta(playlist_id)?;

        let items_url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        let items: PlaylistItemsResponse = self.send(Access::Read, |client| {
            client.get(&items_url).query(&[
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("fields", ITEM_FIELDS.to_string()),
            ])
        })?;

        let after = self.fetch_meta(playlist_id)?;

        log::debug!(
            "GET {} offset={} limit={} -> {} items, total {}, snapshot {} / {}",
            items_url,
            offset,
            limit,
            items.items.len(),
            items.total,
            before.snapshot_id,
            after.snapshot_id
        );

        bracketed_page(before, items, &after, offset)
    }

    /// Moves the track at `from` so that it lands before `insert_before`.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Spotify playlist id
    /// * `from` - Current index of the track
    /// * `insert_before` - Index, in the list before the move, the track is
    ///   placed in front of
    /// * `expected_version` - Snapshot the indices were computed against
    ///
    /// # Returns
    ///
    /// The snapshot produced by the move. Spotify answers a stale snapshot
    /// or an out-of-range index with 400, mapped to
    /// [`GatewayError::Conflict`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// let next = gateway.move_track("37i9dQZF1DXcBWIGoYBM5M", 4, 0, &page.version)?;
    /// ```
    fn move_track(
        &self,
        playlist_id: &str,
        from: usize,
        insert_before: usize,
        expected_version: &str,
    ) -> Result<String, GatewayError> {
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        let body = ReorderTracksRequest {
            range_start: from,
            insert_before,
            range_length: 1,
            snapshot_id: expected_version.to_string(),
        };

        let response: SnapshotResponse =
            self.send(Access::Write, |client| client.put(&url).json(&body))?;
        Ok(response.snapshot_id)
    }

    /// Removes the single occurrence of `track_id` at `index`.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Spotify playlist id
    /// * `index` - Position of the occurrence to remove
    /// * `track_id` - Catalog URI expected at that position
    /// * `expected_version` - Snapshot the index was computed against
    ///
    /// # Returns
    ///
    /// The snapshot produced by the removal. Other occurrences of the same
    /// URI stay in place.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let next = gateway.remove_track_at(id, 7, "spotify:track:4uLU6hMCjMI75M1A2tKUQC", &version)?;
    /// ```
    fn remove_track_at(
        &self,
        playlist_id: &str,
        index: usize,
        track_id: &str,
        expected_version: &str,
    ) -> Result<String, GatewayError> {
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        let body = RemoveTracksRequest {
            tracks: vec![TrackOccurrence {
                uri: track_id.to_string(),
                positions: vec![index],
            }],
            snapshot_id: expected_version.to_string(),
        };

        let response: SnapshotResponse =
            self.send(Access::Write, |client| client.delete(&url).json(&body))?;
        Ok(response.snapshot_id)
    }
}
