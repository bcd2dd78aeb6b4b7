//! OAuth token management for the Wix API.
//!
//! Tokens live behind an async `RwLock`; reads are cheap and refresh takes
//! the write lock for the duration of the token exchange so concurrent 401s
//! trigger a single refresh.

use serde::Deserialize;
use serde_json::json;
use storebridge_domain::{BridgeError, GatewayCredentials, Result};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::InfraError;

struct TokenState {
    access_token: String,
    refresh_token: String,
}

/// Holds the current access token and refreshes it against the OAuth
/// endpoint when the gateway sees a 401.
pub struct TokenManager {
    app_id: String,
    app_secret: String,
    token_url: String,
    state: RwLock<TokenState>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

impl TokenManager {
    pub fn new(credentials: &GatewayCredentials) -> Self {
        Self {
            app_id: credentials.app_id.clone(),
            app_secret: credentials.app_secret.clone(),
            token_url: format!("{}/oauth/access", credentials.base_url.trim_end_matches('/')),
            state: RwLock::new(TokenState {
                access_token: credentials.access_token.clone(),
                refresh_token: credentials.refresh_token.clone(),
            }),
        }
    }

    /// Current bearer token.
    pub async fn access_token(&self) -> String {
        self.state.read().await.access_token.clone()
    }

    /// Exchange the refresh token for a new access token and store both.
    pub async fn refresh(&self, http: &reqwest::Client) -> Result<String> {
        let mut state = self.state.write().await;

        debug!("refreshing gateway access token");
        let response = http
            .post(&self.token_url)
            .json(&json!({
                "grant_type": "refresh_token",
                "client_id": self.app_id,
                "client_secret": self.app_secret,
                "refresh_token": state.refresh_token,
            }))
            .send()
            .await
            .map_err(InfraError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Auth(format!(
                "token refresh rejected (HTTP {}): {body}",
                status.as_u16()
            )));
        }

        let tokens: TokenResponse = response.json().await.map_err(InfraError::from)?;
        state.access_token = tokens.access_token.clone();
        if let Some(refresh_token) = tokens.refresh_token {
            state.refresh_token = refresh_token;
        }
        info!("gateway access token refreshed");
        Ok(tokens.access_token)
    }
}
