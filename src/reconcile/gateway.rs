use thiserror::Error;

use super::model::Track;

/// One page of a playlist read.
#[derive(Debug, Clone)]
pub struct Page {
    pub playlist_name: String,
    /// Entries starting at the requested offset, in playlist order.
    pub tracks: Vec<Track>,
    /// Total number of entries the remote list reported for this read.
    pub total: usize,
    /// Version token of the list at the time of this read.
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("playlist not found")]
    NotFound,

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("playlist version conflict: {0}")]
    Conflict(String),

    #[error("remote service unavailable: {0}")]
    Unavailable(String),
}

/// The remote operations the reconciler needs.
///
/// Implementations are expected to pace and retry transient failures on
/// their own; anything returned as [`GatewayError::Unavailable`] is final.
pub trait PlaylistGateway {
    fn fetch_page(&self, playlist_id: &str, offset: usize, limit: usize)
    -> Result<Page, GatewayError>;

    /// Moves the entry at `from` in front of the entry at `insert_before`.
    /// Returns the list's new version token.
    fn move_track(
        &self,
        playlist_id: &str,
        from: usize,
        insert_before: usize,
        expected_version: &str,
    ) -> Result<String, GatewayError>;

    /// Removes the occurrence of `track_id` at `index`. Returns the list's new
    /// version token. Fails with [`GatewayError::Conflict`] when a different
    /// track sits at `index`.
    fn remove_track_at(
        &self,
        playlist_id: &str,
        index: usize,
        track_id: &str,
        expected_version: &str,
    ) -> Result<String, GatewayError>;
}

impl<G: PlaylistGateway + ?Sized> PlaylistGateway for &G {
    fn fetch_page(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page, GatewayError> {
        (**self).fetch_page(playlist_id, offset, limit)
    }

    fn move_track(
        &self,
        playlist_id: &str,
        from: usize,
        insert_before: usize,
        expected_version: &str,
    ) -> Result<String, GatewayError> {
        (**self).move_track(playlist_id, from, insert_before, expected_version)
    }

    fn remove_track_at(
        &self,
        playlist_id: &str,
        index: usize,
        track_id: &str,
        expected_version: &str,
    ) -> Result<String, GatewayError> {
        (**self).remove_track_at(playlist_id, index, track_id, expected_version)
    }
}
