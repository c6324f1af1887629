use tabled::Table;

use crate::{
    error, info,
    reconcile::{SortOrder, SortOutcome, TrackSummary},
    success,
    types::TrackTableRow,
    utils, warning,
};

use super::{describe, reconciler, run_blocking, spinner};

/// Reorders a playlist by release date and prints the new head of the list.
pub async fn sort(
    playlist: String,
    order: SortOrder,
    expected_version: Option<String>,
    dry_run: bool,
) {
    let playlist_id = match utils::parse_playlist_id(&playlist) {
        Ok(id) => id,
        Err(e) => error!("{}", e),
    };

    let pb = spinner(format!("Sorting playlist {} ({})...", playlist_id, order));

    let result = run_blocking(move || -> Result<SortOutcome, String> {
        reconciler(dry_run)?
            .sort_playlist(&playlist_id, order, expected_version.as_deref())
            .map_err(describe)
    })
    .await;

    pb.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => error!("{}", e),
    };

    if outcome.dry_run {
        info!(
            "Dry run: sorting '{}' ({} tracks, {}) would take {} moves.",
            outcome.playlist_name, outcome.total_tracks, outcome.order, outcome.moves_made
        );
    } else if outcome.moves_made == 0 {
        success!(
            "'{}' is already sorted ({} tracks, {}).",
            outcome.playlist_name,
            outcome.total_tracks,
            outcome.order
        );
    } else {
        success!(
            "Sorted '{}' by release date ({}): {} moves for {} tracks.",
            outcome.playlist_name,
            outcome.order,
            outcome.moves_made,
            outcome.total_tracks
        );
    }

    if !outcome.first_tracks.is_empty() {
        println!("{}", Table::new(track_rows(&outcome.first_tracks)));
    }

    if outcome.concurrent_change_detected {
        warning!("The playlist was also changed by someone else while sorting. Check the result.");
    }
    info!("Playlist version: {}", outcome.final_version);
}

fn track_rows(tracks: &[TrackSummary]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .map(|t| TrackTableRow {
            position: t.position + 1,
            title: utils::truncate(&t.title, 40),
            artists: utils::truncate(&utils::join_artists(&t.artists), 40),
            released: t.release_date.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}
