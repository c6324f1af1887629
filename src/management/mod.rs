//! # Management Module
//!
//! Local state that outlives a single command. Right now that is the OAuth
//! token: [`TokenManager`] loads it from `<data_dir>/cache/token.json`,
//! refreshes it shortly before it expires and writes the refreshed token
//! back.
//!
//! Playlist data is never cached here. Every run reads a fresh snapshot so
//! version checks compare against what Spotify holds right now.

mod auth;

pub use auth::TokenManager;
