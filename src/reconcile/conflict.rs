use super::{error::ReconcileError, model::Snapshot};

/// Compares the caller's expected version with the live snapshot.
///
/// No expectation always passes. A mismatch fails with
/// [`ReconcileError::Conflict`] carrying the live name, version and size so
/// the caller can show the playlist as it is now.
pub fn check_expected(expected: Option<&str>, snapshot: &Snapshot) -> Result<(), ReconcileError> {
    match expected {
        Some(expected) if expected != snapshot.version => {
            log::warn!(
                "playlist '{}' is at version {} but {} was expected",
                snapshot.playlist_name,
                snapshot.version,
                expected
            );
            Err(ReconcileError::Conflict {
                playlist_name: snapshot.playlist_name.clone(),
                expected_version: expected.to_string(),
                actual_version: Some(snapshot.version.clone()),
                total_tracks: snapshot.len(),
            })
        }
        _ => Ok(()),
    }
}

/// True when the version observed after a run differs from the last version
/// our own mutations produced, i.e. someone else edited the list meanwhile.
pub fn drifted(last_written: &str, observed: &str) -> bool {
    if last_written == observed {
        return false;
    }
    log::warn!(
        "playlist version moved from {} to {} outside of this run",
        last_written,
        observed
    );
    true
}
