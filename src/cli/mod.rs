//! # CLI Module
//!
//! User-facing commands of playtidy. Each command parses its arguments,
//! runs the work and prints the result with the colored status macros and
//! [`tabled`] tables.
//!
//! ## Commands
//!
//! - [`auth`] runs the Spotify PKCE login and stores the token
//! - [`playlists`] lists the playlists of the logged-in user with their
//!   current version
//! - [`sort`] reorders a playlist by album release date
//! - [`dedupe`] removes repeated tracks from a playlist
//!
//! ## Blocking work
//!
//! The reconciliation engine and the Spotify gateway are synchronous. The
//! commands run them on tokio's blocking pool via [`run_blocking`] so the
//! spinner keeps ticking while requests are paced by the rate limiter.
//!
//! ## Failures
//!
//! Engine failures are printed with their user-facing message and end the
//! process with exit code 1. A run interrupted after some changes were
//! applied says how many, so the command can simply be repeated.

mod auth;
mod dedupe;
mod playlists;
mod sort;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config, error,
    reconcile::{ReconcileError, Reconciler},
    spotify::SpotifyGateway,
};

pub use auth::auth;
pub use dedupe::dedupe;
pub use playlists::playlists;
pub use sort::sort;

fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

/// Runs blocking gateway work off the async runtime.
async fn run_blocking<T, F>(work: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(value) => value,
        Err(e) => error!("Background task failed: {}", e),
    }
}

/// Engine configured from the environment.
fn reconciler(dry_run: bool) -> Result<Reconciler<SpotifyGateway>, String> {
    let gateway = SpotifyGateway::from_env()?;
    Ok(Reconciler::new(gateway)
        .page_size(config::page_size())
        .preview_len(config::preview_tracks())
        .dry_run(dry_run))
}

fn describe(err: ReconcileError) -> String {
    log::debug!("run failed ({}): {}", err.kind().as_str(), err);
    if let Some(progress) = err.progress() {
        log::info!(
            "{} of {} planned changes were applied before the failure",
            progress.applied,
            progress.planned
        );
    }
    err.user_message()
}
