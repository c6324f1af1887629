use crate::{
    reconcile::GatewayError,
    types::{GetUserPlaylistsResponse, Playlist},
};

use super::gateway::{Access, SpotifyGateway};

/// Page size of the `/me/playlists` endpoint.
const PLAYLISTS_PAGE_SIZE: usize = 50;

impl SpotifyGateway {
    /// Retrieves every playlist of the current user, owned or followed.
    ///
    /// Follows the offset pagination of `GET /me/playlists` until the
    /// response has no `next` link. The `snapshot_id` of each playlist is the
    /// version that can be handed to `sort --expected-version` and
    /// `dedupe --expected-version` to make sure the playlist is still exactly
    /// as listed.
    ///
    /// # Returns
    ///
    /// Every playlist in the order Spotify lists them.
    ///
    /// # Example
    ///
    /// ```ignore
    /// for playlist in gateway.list_user_playlists()? {
    ///     println!("{} ({})", playlist.name, playlist.snapshot_id);
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Forbidden`] when the stored login is missing the
    ///   `playlist-read-private` scope or has been revoked
    /// - [`GatewayError::Unavailable`] after retries are exhausted
    pub fn list_user_playlists(&self) -> Result<Vec<Playlist>, GatewayError> {
        let url = self.url("/me/playlists");
        let mut playlists: Vec<Playlist> = Vec::new();
        let mut offset = 0;

        loop {
            let page: GetUserPlaylistsResponse = self.send(Access::Read, |client| {
                client.get(&url).query(&[
                    ("limit", PLAYLISTS_PAGE_SIZE.to_string()),
                    ("offset", offset.to_string()),
                ])
            })?;

            let fetched = page.items.len();
            playlists.extend(page.items);
            log::debug!("fetched {} of {} playlists", playlists.len(), page.total);

            if page.next.is_none() || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        Ok(playlists)
    }
}
