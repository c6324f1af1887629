//! # Spotify Integration Module
//!
//! Binds the reconciliation engine to the Spotify Web API.
//!
//! ## Overview
//!
//! ```text
//! cli commands
//!      ↓
//! reconcile::Reconciler ── PlaylistGateway trait
//!                                ↓
//!                         SpotifyGateway (blocking reqwest)
//!                                ↓
//!                         RateLimiter (pacing, retry, backoff)
//!                                ↓
//!                         Spotify Web API
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - OAuth 2.0 PKCE login with a local callback server
//! - [`gateway`] - [`SpotifyGateway`], the [`PlaylistGateway`] implementation
//! - [`playlists`] - listing the playlists of the current user
//! - [`rate_limit`] - the process-wide request pacer and retry loop
//!
//! ## Endpoints
//!
//! - `GET /playlists/{id}?fields=name,snapshot_id,tracks.total`
//! - `GET /playlists/{id}/tracks?offset=&limit=` (at most 100 items),
//!   bracketed by two metadata reads that must agree on `snapshot_id`
//! - `PUT /playlists/{id}/tracks` with `range_start`, `insert_before`,
//!   `range_length` and `snapshot_id`
//! - `DELETE /playlists/{id}/tracks` with `{uri, positions}` and
//!   `snapshot_id`, so only the occurrence at the given index is removed
//! - `GET /me/playlists`
//! - `POST /api/token` for the code exchange and refreshes
//!
//! ## Status mapping
//!
//! | Response                         | Gateway error            |
//! |----------------------------------|--------------------------|
//! | 404                              | `NotFound`               |
//! | 401, 403                         | `Forbidden`              |
//! | 400 on a mutation                | `Conflict`               |
//! | 429, 5xx, timeouts (after retry) | `Unavailable`            |
//!
//! The version token of a playlist is its `snapshot_id`. Every mutation
//! sends the latest one and returns the next.
//!
//! [`PlaylistGateway`]: crate::reconcile::PlaylistGateway

pub mod auth;
pub mod gateway;
pub mod playlists;
pub mod rate_limit;

pub use gateway::SpotifyGateway;
pub use rate_limit::{RateLimiter, RetryPolicy};
