use thiserror::Error;

use super::gateway::GatewayError;

/// How far an apply phase got before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub applied: usize,
    pub planned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Unavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("playlist {playlist_id} was not found")]
    NotFound { playlist_id: String },

    #[error("access to playlist {playlist_id} denied: {detail}")]
    Forbidden { playlist_id: String, detail: String },

    /// The playlist is not at the version the caller expected. Nothing has
    /// been changed remotely.
    #[error(
        "playlist '{playlist_name}' changed since it was loaded (expected version {expected_version}, found {})",
        .actual_version.as_deref().unwrap_or("unknown")
    )]
    Conflict {
        playlist_name: String,
        expected_version: String,
        actual_version: Option<String>,
        total_tracks: usize,
    },

    /// Transport or service failure. `progress` is set when the failure hit
    /// after mutations had started; those mutations stay applied.
    #[error("{detail}")]
    Unavailable {
        playlist_name: Option<String>,
        detail: String,
        progress: Option<Progress>,
    },
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::NotFound { .. } => ErrorKind::NotFound,
            ReconcileError::Forbidden { .. } => ErrorKind::Forbidden,
            ReconcileError::Conflict { .. } => ErrorKind::Conflict,
            ReconcileError::Unavailable { .. } => ErrorKind::Unavailable,
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        match self {
            ReconcileError::Unavailable { progress, .. } => *progress,
            _ => None,
        }
    }

    /// Message meant for the person who started the run.
    pub fn user_message(&self) -> String {
        match self {
            ReconcileError::NotFound { playlist_id } => format!(
                "Playlist {} does not exist or is not visible to you. Check the link and try again.",
                playlist_id
            ),
            ReconcileError::Forbidden { detail, .. } => format!(
                "You are not allowed to change this playlist ({}). Only playlists you own or collaborate on can be edited; if your session expired, run `playtidy auth`.",
                detail
            ),
            ReconcileError::Conflict {
                playlist_name,
                total_tracks,
                ..
            } => format!(
                "Playlist '{}' ({} tracks) has been modified since you loaded it. Reload it and try again; nothing was changed.",
                playlist_name, total_tracks
            ),
            ReconcileError::Unavailable {
                progress: Some(progress),
                detail,
                ..
            } => format!(
                "Spotify stopped responding after {} of {} changes ({}). The applied changes are kept; run the same command again to finish.",
                progress.applied, progress.planned, detail
            ),
            ReconcileError::Unavailable { detail, .. } => format!(
                "Spotify services are temporarily unavailable ({}). Nothing was changed; please try again later.",
                detail
            ),
        }
    }

    /// Translates a gateway failure during a read, before any mutation.
    pub(crate) fn from_read(playlist_id: &str, err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound => ReconcileError::NotFound {
                playlist_id: playlist_id.to_string(),
            },
            GatewayError::Forbidden(detail) => ReconcileError::Forbidden {
                playlist_id: playlist_id.to_string(),
                detail,
            },
            GatewayError::Conflict(detail) | GatewayError::Unavailable(detail) => {
                ReconcileError::Unavailable {
                    playlist_name: None,
                    detail,
                    progress: None,
                }
            }
        }
    }
}
