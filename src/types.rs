use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistMeta {
    pub name: String,
    pub snapshot_id: String,
    pub tracks: TracksTotal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksTotal {
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemsResponse {
    pub items: Vec<PlaylistItem>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub added_at: Option<String>,
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub album: Option<SimpleAlbum>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleAlbum {
    #[serde(default)]
    pub name: String,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderTracksRequest {
    pub range_start: usize,
    pub insert_before: usize,
    pub range_length: usize,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackOccurrence>,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackOccurrence {
    pub uri: String,
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Playlist>,
    pub next: Option<String>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub snapshot_id: String,
    pub owner: PlaylistOwner,
    pub tracks: TracksTotal,
    #[serde(default)]
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub id: String,
    pub tracks: usize,
    pub owner: String,
    pub version: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub title: String,
    pub artists: String,
    pub released: String,
}

#[derive(Tabled)]
pub struct DuplicateTableRow {
    pub title: String,
    pub artists: String,
    pub albums: String,
    pub count: usize,
}
