use tabled::Table;

use crate::{
    error,
    spotify::SpotifyGateway,
    success,
    types::{Playlist, PlaylistTableRow},
    utils, warning,
};

use super::{run_blocking, spinner};

/// Prints the current user's playlists with id, size and version.
pub async fn playlists() {
    let pb = spinner("Fetching playlists...");

    let result = run_blocking(|| -> Result<Vec<Playlist>, String> {
        let gateway = SpotifyGateway::from_env()?;
        gateway.list_user_playlists().map_err(|e| e.to_string())
    })
    .await;

    pb.finish_and_clear();

    let playlists = match result {
        Ok(playlists) => playlists,
        Err(e) => error!("Cannot list playlists. Err: {}", e),
    };

    if playlists.is_empty() {
        warning!("No playlists found for this account.");
        return;
    }

    success!("Found {} playlists.", playlists.len());

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: utils::truncate(&p.name, 40),
            id: p.id,
            tracks: p.tracks.total,
            owner: p.owner.display_name.unwrap_or(p.owner.id),
            version: p.snapshot_id,
        })
        .collect();

    println!("{}", Table::new(rows));
}
