use std::{fs, path::PathBuf};

use chrono::Utc;
use reqwest::blocking::Client;

use crate::{config, types::Token};

/// Seconds before expiry at which a token is already treated as expired.
const EXPIRY_MARGIN: u64 = 240;

pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token })
    }

    pub fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing it first when it is about to expire.
    ///
    /// A failed refresh keeps the old token; the remote side then rejects it
    /// and the caller sees an authorization error.
    pub fn get_valid_token(&mut self) -> String {
        if self.is_expired() {
            match self.refresh_token() {
                Ok(new_token) => {
                    self.token = new_token;
                    if let Err(e) = self.persist() {
                        log::warn!("refreshed token could not be saved: {}", e);
                    }
                }
                Err(e) => log::warn!("token refresh failed: {}", e),
            }
        }

        self.token.access_token.clone()
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= self.token.obtained_at + self.token.expires_in.saturating_sub(EXPIRY_MARGIN)
    }

    fn refresh_token(&self) -> Result<Token, String> {
        log::debug!("refreshing access token");
        let res = Client::new()
            .post(config::spotify_apitoken_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.token.refresh_token.as_str()),
                ("client_id", config::spotify_client_id()?.as_str()),
            ])
            .send()
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let json: serde_json::Value = res.json().map_err(|e| e.to_string())?;

        Ok(Token {
            access_token: json["access_token"]
                .as_str()
                .ok_or("refresh response carried no access token")?
                .to_string(),
            // Spotify may keep the refresh token unchanged and omit it
            refresh_token: json["refresh_token"]
                .as_str()
                .unwrap_or(&self.token.refresh_token)
                .to_string(),
            scope: json["scope"]
                .as_str()
                .unwrap_or(&self.token.scope)
                .to_string(),
            expires_in: json["expires_in"].as_u64().unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        })
    }

    fn token_path() -> PathBuf {
        let mut path = config::data_dir();
        path.push("cache/token.json");
        path
    }
}
