//! HTTP endpoints of the local login server.
//!
//! The server only runs while `playtidy auth` waits for Spotify to redirect
//! the browser back with an authorization code.
//!
//! - [`callback`] receives the code and exchanges it for a token using the
//!   PKCE verifier held in the shared state
//! - [`health`] answers with the status and version, handy to check that the
//!   configured `SERVER_ADDRESS` is reachable

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
