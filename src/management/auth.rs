use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;

use crate::{
    error::UpstreamError,
    success,
    types::{AccessToken, SpotifyCredentials, TokenResponse},
};

const TOKEN_TIMEOUT: Duration = Duration::from_secs(3);

pub struct TokenManager {
    credentials: Option<SpotifyCredentials>,
    token_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(credentials: Option<SpotifyCredentials>, token_url: String) -> Self {
        Self {
            credentials,
            token_url,
            token: Mutex::new(None),
        }
    }

    pub fn with_token(
        credentials: Option<SpotifyCredentials>,
        token_url: String,
        token: AccessToken,
    ) -> Self {
        Self {
            credentials,
            token_url,
            token: Mutex::new(Some(token)),
        }
    }

    pub async fn access_token(&self) -> Result<String, UpstreamError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(UpstreamError::MissingCredentials("spotify"))?;

        {
            let guard = self.token.lock().await;
            if let Some(token) = guard.as_ref() {
                if !is_expired(token) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        // The lock is not held across the exchange; concurrent refreshes may
        // race, and both writes are whole-value replacements.
        let fresh = self.refresh(credentials).await?;
        let access_token = fresh.access_token.clone();
        *self.token.lock().await = Some(fresh);
        success!("Refreshed Spotify access token");
        Ok(access_token)
    }

    pub async fn cached_token(&self) -> Option<AccessToken> {
        self.token.lock().await.clone()
    }

    pub async fn reset(&self) {
        *self.token.lock().await = None;
    }

    async fn refresh(
        &self,
        credentials: &SpotifyCredentials,
    ) -> Result<AccessToken, UpstreamError> {
        let basic = STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));

        let client = Client::new();
        let res = client
            .post(&self.token_url)
            .header("Authorization", format!("Basic {basic}"))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .timeout(TOKEN_TIMEOUT)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            // A rejection normally carries an error body; a non-JSON body
            // is reported by status alone.
            let detail = match res.json::<TokenResponse>().await {
                Ok(body) => rejection_detail(&body, status),
                Err(_) => format!("token endpoint returned {status}"),
            };
            return Err(UpstreamError::AuthRejected(detail));
        }

        let body: TokenResponse = res.json().await?;
        if body.error.is_some() {
            return Err(UpstreamError::AuthRejected(rejection_detail(&body, status)));
        }

        let access_token = body.access_token.ok_or_else(|| {
            UpstreamError::AuthRejected("token endpoint returned no access_token".to_string())
        })?;

        Ok(AccessToken {
            access_token,
            scope: body.scope.unwrap_or_default(),
            expires_in: body.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        })
    }
}

fn rejection_detail(body: &TokenResponse, status: StatusCode) -> String {
    match (&body.error, &body.error_description) {
        (Some(error), Some(description)) => format!("{error}: {description}"),
        (Some(error), None) => error.clone(),
        _ => format!("token endpoint returned {status}"),
    }
}

// A token is treated as expired once five sixths of its lifetime have passed,
// so a 60 minute token is refreshed after 50 minutes.
fn is_expired(token: &AccessToken) -> bool {
    let now = Utc::now().timestamp() as u64;
    now >= token.obtained_at + token.expires_in * 5 / 6
}
