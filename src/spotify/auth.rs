use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::{
    config, error,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

/// How long the login waits for the browser to come back to the callback.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the OAuth 2.0 PKCE login against Spotify and stores the token.
///
/// Generates a verifier and its S256 challenge, starts the local callback
/// server, opens the authorization page in the browser and waits for the
/// callback handler to exchange the code. The resulting token is written to
/// the token cache used by every later command.
///
/// Terminates the process when the client id is missing, the login times out
/// or the token cannot be saved.
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let client_id = match config::spotify_client_id() {
        Ok(id) => id,
        Err(e) => error!("{}", e),
    };

    let auth_url = match authorization_url(&client_id, &code_challenge) {
        Ok(url) => url,
        Err(e) => error!("Invalid authorization URL: {}", e),
    };

    // verifier must be in place before the callback can arrive
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(token) => {
            let token_manager = TokenManager::new(token);
            if let Err(e) = token_manager.persist() {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

fn authorization_url(client_id: &str, code_challenge: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", config::spotify_redirect_uri().as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", config::spotify_scope().as_str()),
        ],
    )
}

/// Polls the shared state until the callback handler stored a token.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < LOGIN_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges the authorization code from the callback for a token.
///
/// The verifier must be the one whose challenge was sent with the
/// authorization request.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, String> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri();

    let res = Client::new()
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;

    let json: Value = res.json().await.map_err(|e| e.to_string())?;

    let field = |name: &str| -> Result<String, String> {
        json[name]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("token response is missing `{}`", name))
    };

    Ok(Token {
        access_token: field("access_token")?,
        refresh_token: field("refresh_token")?,
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
