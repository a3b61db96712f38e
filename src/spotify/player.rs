use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{
    error::UpstreamError,
    management::TokenManager,
    types::{CurrentlyPlaying, RecentlyPlayedResponse},
};

const PLAYER_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a currently-playing lookup.
///
/// Distinguishes the three non-error upstream shapes the resolver cares
/// about: a playback object was returned (`Active`), the endpoint answered
/// 204 No Content (`Empty`), or it answered with an error status (`Failed`).
/// Transport problems are not represented here; they surface as
/// [`UpstreamError`] from the call itself.
#[derive(Debug, Clone)]
pub enum PlaybackStatus {
    Active(CurrentlyPlaying),
    Empty,
    Failed(u16),
}

/// A source of playback state for the now-playing resolver.
///
/// The resolver is generic over this trait so the fallback pipeline can be
/// driven by a scripted source in tests. [`SpotifyClient`] is the production
/// implementation.
#[async_trait]
pub trait PlayerSource: Send + Sync {
    async fn current_playback(&self) -> Result<PlaybackStatus, UpstreamError>;
    async fn recently_played(&self) -> Result<RecentlyPlayedResponse, UpstreamError>;
}

pub struct SpotifyClient {
    tokens: TokenManager,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager, api_url: String) -> Self {
        Self { tokens, api_url }
    }
}

#[async_trait]
impl PlayerSource for SpotifyClient {
    /// Fetches the user's current playback state from the Spotify Web API.
    ///
    /// Obtains a bearer token from the token cache first; a token failure
    /// fails the whole call. The request itself is bounded by a 3 second
    /// timeout.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(PlaybackStatus::Active)` - a 200 response with a playback body
    ///   (the track item inside may still be absent)
    /// - `Ok(PlaybackStatus::Empty)` - a 204 response, nothing playing
    /// - `Ok(PlaybackStatus::Failed)` - an error status from the endpoint
    /// - `Err(UpstreamError)` - token acquisition, transport or timeout
    ///   failure, or an unparseable 200 body
    ///
    /// # API Endpoint
    ///
    /// Uses Spotify's `GET /me/player/currently-playing` endpoint with no
    /// query parameters.
    ///
    /// # Example
    ///
    /// ```
    /// match client.current_playback().await? {
    ///     PlaybackStatus::Active(playing) => println!("live: {}", playing.is_playing),
    ///     PlaybackStatus::Empty => println!("nothing playing"),
    ///     PlaybackStatus::Failed(status) => println!("upstream said {}", status),
    /// }
    /// ```
    async fn current_playback(&self) -> Result<PlaybackStatus, UpstreamError> {
        let token = self.tokens.access_token().await?;

        let client = Client::new();
        let response = client
            .get(format!("{}/me/player/currently-playing", self.api_url))
            .bearer_auth(token)
            .timeout(PLAYER_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(PlaybackStatus::Empty);
        }
        if status.is_client_error() || status.is_server_error() {
            return Ok(PlaybackStatus::Failed(status.as_u16()));
        }

        let playing = response.json::<CurrentlyPlaying>().await?;
        Ok(PlaybackStatus::Active(playing))
    }

    /// Fetches the most recent playback event from the Spotify Web API.
    ///
    /// Requests exactly one history item; the resolver only ever uses the
    /// most recent one. Obtains a bearer token from the token cache first
    /// and bounds the request to 3 seconds, like the playback lookup.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(RecentlyPlayedResponse)` - a 200 response with a history payload
    ///   (the item list may be empty for a fresh account)
    /// - `Err(UpstreamError)` - any non-200 status, token acquisition
    ///   failure, transport failure or timeout
    ///
    /// Unlike the playback lookup there is no meaningful non-200 outcome
    /// here, so everything but success is an error and the caller falls
    /// through to its next stage.
    ///
    /// # API Endpoint
    ///
    /// Uses Spotify's `GET /me/player/recently-played` endpoint with
    /// `limit=1`.
    async fn recently_played(&self) -> Result<RecentlyPlayedResponse, UpstreamError> {
        let token = self.tokens.access_token().await?;

        let client = Client::new();
        let response = client
            .get(format!("{}/me/player/recently-played?limit=1", self.api_url))
            .bearer_auth(token)
            .timeout(PLAYER_TIMEOUT)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Transport(format!(
                "recently-played returned {}",
                response.status()
            )));
        }

        let recent = response.json::<RecentlyPlayedResponse>().await?;
        Ok(recent)
    }
}
