use super::{
    error::{Progress, ReconcileError},
    gateway::{GatewayError, PlaylistGateway},
    model::{Operation, Snapshot},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    /// Version token returned by the last successful mutation.
    pub last_version: String,
}

/// Sends `ops` to the remote list strictly in order.
///
/// Each call carries the version produced by the previous one, so the remote
/// side resolves indices against exactly the state this run expects. The
/// first failure stops the run. A failure before anything was applied is
/// reported as the gateway's own kind; after that it becomes
/// [`ReconcileError::Unavailable`] with the progress made, since the applied
/// operations cannot be taken back.
pub fn apply_operations<G: PlaylistGateway + ?Sized>(
    gateway: &G,
    snapshot: &Snapshot,
    ops: &[Operation],
) -> Result<ApplyReport, ReconcileError> {
    let planned = ops.len();
    let mut version = snapshot.version.clone();

    for (applied, op) in ops.iter().enumerate() {
        log::debug!("[{}/{}] {}", applied + 1, planned, op);

        let result = match op {
            Operation::Reorder {
                from,
                insert_before,
                ..
            } => gateway.move_track(&snapshot.playlist_id, *from, *insert_before, &version),
            Operation::RemoveAt { index, track_id } => {
                gateway.remove_track_at(&snapshot.playlist_id, *index, track_id, &version)
            }
        };

        match result {
            Ok(next) => version = next,
            Err(err) => {
                log::error!(
                    "operation {}/{} on '{}' failed: {} ({})",
                    applied + 1,
                    planned,
                    snapshot.playlist_name,
                    op,
                    err
                );
                return Err(interrupted(snapshot, &version, err, applied, planned));
            }
        }
    }

    Ok(ApplyReport {
        applied: planned,
        last_version: version,
    })
}

fn interrupted(
    snapshot: &Snapshot,
    version: &str,
    err: GatewayError,
    applied: usize,
    planned: usize,
) -> ReconcileError {
    if applied == 0 {
        return match err {
            GatewayError::Conflict(_) => ReconcileError::Conflict {
                playlist_name: snapshot.playlist_name.clone(),
                expected_version: version.to_string(),
                actual_version: None,
                total_tracks: snapshot.len(),
            },
            GatewayError::Unavailable(detail) => ReconcileError::Unavailable {
                playlist_name: Some(snapshot.playlist_name.clone()),
                detail,
                progress: Some(Progress { applied, planned }),
            },
            other => ReconcileError::from_read(&snapshot.playlist_id, other),
        };
    }

    let detail = match err {
        GatewayError::Conflict(detail) => {
            format!("playlist was changed by someone else during the run: {detail}")
        }
        other => other.to_string(),
    };

    ReconcileError::Unavailable {
        playlist_name: Some(snapshot.playlist_name.clone()),
        detail,
        progress: Some(Progress { applied, planned }),
    }
}
