use tabled::Table;

use crate::{
    error, info,
    reconcile::DedupeOutcome,
    success,
    types::DuplicateTableRow,
    utils, warning,
};

use super::{describe, reconciler, run_blocking, spinner};

/// Duplicate groups listed in the table.
const MAX_GROUP_ROWS: usize = 10;

/// Removes repeated tracks from a playlist, keeping each first occurrence.
pub async fn dedupe(playlist: String, expected_version: Option<String>, dry_run: bool) {
    let playlist_id = match utils::parse_playlist_id(&playlist) {
        Ok(id) => id,
        Err(e) => error!("{}", e),
    };

    let pb = spinner(format!("Looking for duplicates in {}...", playlist_id));

    let result = run_blocking(move || -> Result<DedupeOutcome, String> {
        reconciler(dry_run)?
            .remove_duplicates(&playlist_id, expected_version.as_deref())
            .map_err(describe)
    })
    .await;

    pb.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => error!("{}", e),
    };

    if outcome.duplicate_groups.is_empty() {
        success!(
            "'{}' has no duplicates ({} tracks).",
            outcome.playlist_name,
            outcome.total_tracks
        );
        info!("Playlist version: {}", outcome.final_version);
        return;
    }

    let rows: Vec<DuplicateTableRow> = outcome
        .duplicate_groups
        .iter()
        .take(MAX_GROUP_ROWS)
        .map(|g| DuplicateTableRow {
            title: utils::truncate(&g.title, 40),
            artists: utils::truncate(&utils::join_artists(&g.artists), 40),
            albums: utils::truncate(&g.albums.join(" | "), 60),
            count: g.count,
        })
        .collect();
    println!("{}", Table::new(rows));
    if outcome.duplicate_groups.len() > MAX_GROUP_ROWS {
        info!(
            "... and {} more groups.",
            outcome.duplicate_groups.len() - MAX_GROUP_ROWS
        );
    }

    if outcome.identical_id_groups > 0 {
        info!(
            "{} of {} groups repeat the very same track.",
            outcome.identical_id_groups,
            outcome.duplicate_groups.len()
        );
    }

    if outcome.dry_run {
        info!(
            "Dry run: {} of {} tracks in '{}' would be removed, {} would remain.",
            outcome.tracks_removed,
            outcome.total_tracks,
            outcome.playlist_name,
            outcome.unique_tracks
        );
    } else {
        success!(
            "Removed {} duplicates from '{}'. {} tracks remain.",
            outcome.tracks_removed,
            outcome.playlist_name,
            outcome.final_track_count
        );
    }

    if outcome.concurrent_change_detected {
        warning!("The playlist was also changed by someone else during the run. Check the result.");
    }
    info!("Playlist version: {}", outcome.final_version);
}
