//! # Playlist Reconciliation
//!
//! This module rewrites a remote playlist into one of two target orders
//! without losing entries: sorted by release date, or with duplicate tracks
//! collapsed onto their first occurrence.
//!
//! ## Pipeline
//!
//! ```text
//! playlist id (+ expected version)
//!          ↓
//! Snapshot Fetcher   (snapshot)  all pages, one version token
//!          ↓
//! Conflict Detector  (conflict)  expected vs live version, before any write
//!          ↓
//! Order Planner      (planner)   release order | duplicate groups
//!          ↓
//! Diff               (diff)      minimal moves | descending removals
//!          ↓
//! Apply              (apply)     one remote call per operation, in order
//!          ↓
//! post-run check                 re-read head, compare versions
//! ```
//!
//! ## Remote access
//!
//! Everything remote goes through the [`PlaylistGateway`] trait, so the
//! engine runs the same against Spotify ([`crate::spotify::SpotifyGateway`])
//! and against in-memory doubles in tests. The engine is synchronous and
//! issues one request at a time.
//!
//! ## Guarantees
//!
//! - **Pre-run**: a caller-supplied version that does not match the live
//!   playlist aborts with [`ReconcileError::Conflict`] before any write.
//! - **Mid-run**: best effort. Every write carries the version produced by the
//!   previous write; the first failure stops the run and reports how many
//!   operations were applied. Applied operations are not rolled back.
//! - **Re-runs converge**: both target orders are idempotent, so running the
//!   same command again after an interruption finishes the job, and running
//!   it on an already tidy playlist changes nothing.

pub mod apply;
pub mod conflict;
pub mod diff;
pub mod error;
pub mod gateway;
pub mod model;
pub mod planner;
pub mod snapshot;

pub use error::{ErrorKind, Progress, ReconcileError};
pub use gateway::{GatewayError, Page, PlaylistGateway};
pub use model::{DatePrecision, DuplicateGroup, Operation, ReleaseDate, Snapshot, SortOrder, Track};
pub use snapshot::DEFAULT_PAGE_SIZE;

/// Number of tracks reported back after a sort.
pub const DEFAULT_PREVIEW_LEN: usize = 10;

/// Short description of a track for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSummary {
    pub position: usize,
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub release_date: Option<String>,
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        TrackSummary {
            position: track.position,
            title: track.title.clone(),
            artists: track.artists.clone(),
            album: track.album.clone(),
            release_date: track.release_date.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSummary {
    pub title: String,
    pub artists: Vec<String>,
    pub albums: Vec<String>,
    pub count: usize,
    pub positions: Vec<usize>,
}

impl From<&DuplicateGroup> for DuplicateSummary {
    fn from(group: &DuplicateGroup) -> Self {
        DuplicateSummary {
            title: group.title.clone(),
            artists: group.artists.clone(),
            albums: group.albums.clone(),
            count: group.count(),
            positions: group.positions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub playlist_name: String,
    pub order: SortOrder,
    pub total_tracks: usize,
    /// Moves applied, or planned when `dry_run` is set.
    pub moves_made: usize,
    pub first_tracks: Vec<TrackSummary>,
    pub dry_run: bool,
    pub final_version: String,
    pub concurrent_change_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeOutcome {
    pub playlist_name: String,
    pub total_tracks: usize,
    pub unique_tracks: usize,
    pub duplicate_groups: Vec<DuplicateSummary>,
    /// Removals applied, or planned when `dry_run` is set.
    pub tracks_removed: usize,
    /// Groups in which the very same catalog id occurs more than once.
    pub identical_id_groups: usize,
    pub final_track_count: usize,
    pub dry_run: bool,
    pub final_version: String,
    pub concurrent_change_detected: bool,
}

/// Runs sort and de-duplication against one gateway.
///
/// # Example
///
/// ```ignore
/// let reconciler = Reconciler::new(gateway).dry_run(true);
/// let outcome = reconciler.sort_playlist("37i9dQZF1DXcBWIGoYBM5M", SortOrder::Newest, None)?;
/// println!("{} moves needed", outcome.moves_made);
/// ```
pub struct Reconciler<G> {
    gateway: G,
    page_size: usize,
    preview_len: usize,
    dry_run: bool,
}

impl<G: PlaylistGateway> Reconciler<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            page_size: DEFAULT_PAGE_SIZE,
            preview_len: DEFAULT_PREVIEW_LEN,
            dry_run: false,
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn preview_len(mut self, preview_len: usize) -> Self {
        self.preview_len = preview_len;
        self
    }

    /// Plan and report only; no mutation is sent.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reorders the playlist by release date.
    ///
    /// Reads a consistent snapshot, checks `expected_version` against it,
    /// then moves the fewest tracks needed to reach the stable release
    /// order. Undated entries keep their relative order at the end.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Remote playlist id
    /// * `order` - [`SortOrder::Newest`] or [`SortOrder::Oldest`] first
    /// * `expected_version` - Version the caller last saw; `None` skips the
    ///   check
    ///
    /// # Returns
    ///
    /// A [`SortOutcome`] with the number of moves applied (or planned on a
    /// dry run), the first tracks of the result and the final version.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::Conflict`] before any write when the version does
    /// not match, [`ReconcileError::Unavailable`] with progress when a write
    /// fails partway.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let outcome = reconciler.sort_playlist(id, SortOrder::Oldest, Some(&version))?;
    /// println!("{} moves", outcome.moves_made);
    /// ```
    pub fn sort_playlist(
        &self,
        playlist_id: &str,
        order: SortOrder,
        expected_version: Option<&str>,
    ) -> Result<SortOutcome, ReconcileError> {
        let snapshot = snapshot::fetch_snapshot(&self.gateway, playlist_id, self.page_size)?;
        conflict::check_expected(expected_version, &snapshot)?;

        let target = planner::release_order(&snapshot.tracks, order);
        let ops = diff::plan_moves(&snapshot.tracks, &target).ok_or_else(|| {
            ReconcileError::Unavailable {
                playlist_name: Some(snapshot.playlist_name.clone()),
                detail: "release order is not a permutation of the snapshot".to_string(),
                progress: None,
            }
        })?;

        log::info!(
            "sorting '{}' ({} tracks, {}): {} moves planned",
            snapshot.playlist_name,
            snapshot.len(),
            order,
            ops.len()
        );

        let local_preview = || -> Vec<TrackSummary> {
            target
                .iter()
                .take(self.preview_len)
                .enumerate()
                .map(|(i, &pos)| TrackSummary {
                    position: i,
                    ..TrackSummary::from(&snapshot.tracks[pos])
                })
                .collect()
        };

        if self.dry_run || ops.is_empty() {
            return Ok(SortOutcome {
                playlist_name: snapshot.playlist_name.clone(),
                order,
                total_tracks: snapshot.len(),
                moves_made: if self.dry_run { ops.len() } else { 0 },
                first_tracks: local_preview(),
                dry_run: self.dry_run,
                final_version: snapshot.version.clone(),
                concurrent_change_detected: false,
            });
        }

        let report = apply::apply_operations(&self.gateway, &snapshot, &ops)?;

        let (first_tracks, final_version, concurrent_change_detected) =
            match self.read_head(playlist_id, self.preview_len.max(1)) {
                Some(head) => {
                    let drift = conflict::drifted(&report.last_version, &head.version);
                    let tracks = head
                        .tracks
                        .iter()
                        .take(self.preview_len)
                        .enumerate()
                        .map(|(i, t)| TrackSummary {
                            position: i,
                            ..TrackSummary::from(t)
                        })
                        .collect();
                    (tracks, head.version, drift)
                }
                None => (local_preview(), report.last_version.clone(), false),
            };

        Ok(SortOutcome {
            playlist_name: snapshot.playlist_name,
            order,
            total_tracks: snapshot.tracks.len(),
            moves_made: report.applied,
            first_tracks,
            dry_run: false,
            final_version,
            concurrent_change_detected,
        })
    }

    /// Removes every duplicate but the first occurrence of each group.
    ///
    /// Tracks are duplicates when their titles match exactly and they share
    /// the same set of artists. Removals run from the highest index down so
    /// earlier indices stay valid.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Remote playlist id
    /// * `expected_version` - Version the caller last saw; `None` skips the
    ///   check
    ///
    /// # Returns
    ///
    /// A [`DedupeOutcome`] listing the duplicate groups, the removals
    /// applied (or planned on a dry run) and the final version.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let outcome = reconciler.remove_duplicates(id, None)?;
    /// println!("{} removed", outcome.tracks_removed);
    /// ```
    pub fn remove_duplicates(
        &self,
        playlist_id: &str,
        expected_version: Option<&str>,
    ) -> Result<DedupeOutcome, ReconcileError> {
        let snapshot = snapshot::fetch_snapshot(&self.gateway, playlist_id, self.page_size)?;
        conflict::check_expected(expected_version, &snapshot)?;

        let plan = planner::duplicate_plan(&snapshot.tracks);
        let ops = diff::plan_removals(
            &snapshot.tracks,
            plan.groups.iter().flat_map(|g| g.redundant().iter().copied()),
        );

        for group in &plan.groups {
            log::debug!(
                "duplicate group '{}' by {}: keeping {}, removing {:?}",
                group.title,
                group.artists.join(", "),
                group.keeper(),
                group.redundant()
            );
        }
        log::info!(
            "de-duplicating '{}' ({} tracks): {} groups, {} removals planned",
            snapshot.playlist_name,
            snapshot.len(),
            plan.groups.len(),
            ops.len()
        );

        let duplicate_groups: Vec<DuplicateSummary> =
            plan.groups.iter().map(DuplicateSummary::from).collect();
        let identical_id_groups = plan
            .groups
            .iter()
            .filter(|g| g.has_identical_ids())
            .count();
        let unique_tracks = plan.target.len();

        if self.dry_run || ops.is_empty() {
            return Ok(DedupeOutcome {
                playlist_name: snapshot.playlist_name.clone(),
                total_tracks: snapshot.len(),
                unique_tracks,
                duplicate_groups,
                tracks_removed: if self.dry_run { ops.len() } else { 0 },
                identical_id_groups,
                final_track_count: if self.dry_run {
                    snapshot.len()
                } else {
                    unique_tracks
                },
                dry_run: self.dry_run,
                final_version: snapshot.version.clone(),
                concurrent_change_detected: false,
            });
        }

        let report = apply::apply_operations(&self.gateway, &snapshot, &ops)?;

        let (final_track_count, final_version, concurrent_change_detected) =
            match self.read_head(playlist_id, 1) {
                Some(head) => {
                    let drift = conflict::drifted(&report.last_version, &head.version);
                    (head.total, head.version, drift)
                }
                None => (
                    snapshot.len() - report.applied,
                    report.last_version.clone(),
                    false,
                ),
            };

        Ok(DedupeOutcome {
            playlist_name: snapshot.playlist_name,
            total_tracks: snapshot.tracks.len(),
            unique_tracks,
            duplicate_groups,
            tracks_removed: report.applied,
            identical_id_groups,
            final_track_count,
            dry_run: false,
            final_version,
            concurrent_change_detected,
        })
    }

    /// Re-reads the start of the playlist after a run. A failure here does
    /// not undo a successful run, so it is only logged.
    fn read_head(&self, playlist_id: &str, limit: usize) -> Option<Page> {
        match self.gateway.fetch_page(playlist_id, 0, limit) {
            Ok(page) => Some(page),
            Err(e) => {
                log::warn!("could not verify playlist {} after the run: {}", playlist_id, e);
                None
            }
        }
    }
}
