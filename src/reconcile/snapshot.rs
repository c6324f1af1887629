use super::{
    error::ReconcileError,
    gateway::{GatewayError, PlaylistGateway},
    model::{Snapshot, Track},
};

/// Largest page the Spotify playlist items endpoint serves.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A full read is attempted this many times before an inconsistent page
/// sequence is reported as unavailable.
const FETCH_ATTEMPTS: usize = 2;

enum FetchFailure {
    Remote(GatewayError),
    Inconsistent(String),
}

impl From<GatewayError> for FetchFailure {
    fn from(err: GatewayError) -> Self {
        match err {
            // a conflict on a read means the list moved under us
            GatewayError::Conflict(detail) => FetchFailure::Inconsistent(detail),
            other => FetchFailure::Remote(other),
        }
    }
}

/// Reads every page of a playlist into one [`Snapshot`].
///
/// Pages are requested one after another. The version token of the first
/// page becomes the snapshot's version; a later page reporting another
/// version or another total means the list was edited mid-read, in which
/// case the whole read starts over once. A second inconsistent read is
/// returned as [`ReconcileError::Unavailable`].
///
/// # Arguments
///
/// * `gateway` - Remote side of the playlist
/// * `playlist_id` - Remote playlist id
/// * `page_size` - Items per page request, at least 1
///
/// # Returns
///
/// The snapshot with `position == index` for every track, or the read
/// error mapped onto a [`ReconcileError`].
///
/// # Example
///
/// ```ignore
/// let snapshot = fetch_snapshot(&gateway, "37i9dQZF1DXcBWIGoYBM5M", DEFAULT_PAGE_SIZE)?;
/// println!("{} tracks at {}", snapshot.len(), snapshot.version);
/// ```
pub fn fetch_snapshot<G: PlaylistGateway + ?Sized>(
    gateway: &G,
    playlist_id: &str,
    page_size: usize,
) -> Result<Snapshot, ReconcileError> {
    let page_size = page_size.max(1);
    let mut last_detail = String::new();

    for attempt in 1..=FETCH_ATTEMPTS {
        match fetch_once(gateway, playlist_id, page_size) {
            Ok(snapshot) => {
                log::debug!(
                    "snapshot of '{}' complete: {} tracks at version {}",
                    snapshot.playlist_name,
                    snapshot.len(),
                    snapshot.version
                );
                return Ok(snapshot);
            }
            Err(FetchFailure::Remote(err)) => {
                return Err(ReconcileError::from_read(playlist_id, err));
            }
            Err(FetchFailure::Inconsistent(detail)) => {
                log::warn!(
                    "inconsistent read of playlist {} (attempt {}/{}): {}",
                    playlist_id,
                    attempt,
                    FETCH_ATTEMPTS,
                    detail
                );
                last_detail = detail;
            }
        }
    }

    Err(ReconcileError::Unavailable {
        playlist_name: None,
        detail: format!(
            "playlist {} kept changing while it was read: {}",
            playlist_id, last_detail
        ),
        progress: None,
    })
}

fn fetch_once<G: PlaylistGateway + ?Sized>(
    gateway: &G,
    playlist_id: &str,
    page_size: usize,
) -> Result<Snapshot, FetchFailure> {
    let first = gateway.fetch_page(playlist_id, 0, page_size)?;
    let total = first.total;
    let version = first.version;
    let playlist_name = first.playlist_name;

    let mut tracks: Vec<Track> = Vec::with_capacity(total);
    tracks.extend(first.tracks);
    log::debug!(
        "fetched page at offset 0: {} of {} tracks",
        tracks.len(),
        total
    );

    while tracks.len() < total {
        let offset = tracks.len();
        let page = gateway.fetch_page(playlist_id, offset, page_size)?;

        if page.total != total {
            return Err(FetchFailure::Inconsistent(format!(
                "total changed from {} to {} at offset {}",
                total, page.total, offset
            )));
        }
        if page.version != version {
            return Err(FetchFailure::Inconsistent(format!(
                "version changed from {} to {} at offset {}",
                version, page.version, offset
            )));
        }
        if page.tracks.is_empty() {
            return Err(FetchFailure::Inconsistent(format!(
                "empty page at offset {} while {} tracks were announced",
                offset, total
            )));
        }

        tracks.extend(page.tracks);
        log::debug!(
            "fetched page at offset {}: {} of {} tracks",
            offset,
            tracks.len(),
            total
        );
    }

    if tracks.len() != total {
        return Err(FetchFailure::Inconsistent(format!(
            "received {} tracks while {} were announced",
            tracks.len(),
            total
        )));
    }

    for (position, track) in tracks.iter_mut().enumerate() {
        track.position = position;
    }

    Ok(Snapshot {
        playlist_id: playlist_id.to_string(),
        playlist_name,
        version,
        tracks,
    })
}
