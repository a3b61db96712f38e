//! Configuration management for the portfolio backend.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, the GitHub API token, the
//! remote visitor store and server settings.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)
//!
//! Credentials are optional by design: a missing credential is a runtime
//! condition handled per endpoint (now-playing degrades, contribution stats
//! answer with a fixed error envelope), never a startup failure.

use std::{env, path::PathBuf};

use dotenv;

use crate::{
    Res,
    types::{KvCredentials, SpotifyCredentials},
};

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const DEFAULT_JSONBIN_BASE_URL: &str = "https://api.jsonbin.io/v3";

/// Loads environment variables from `.env` files.
///
/// Looks for a `.env` file in the current working directory first, then in
/// the platform-specific local data directory under `foliosrv/.env`. Both
/// files are optional; variables already present in the process environment
/// always win. The data directory is created if it does not exist so users
/// can drop a `.env` next to the cache files the server writes.
///
/// # Directory Structure
///
/// The function looks for the fallback `.env` file in:
/// - Linux: `~/.local/share/foliosrv/.env`
/// - macOS: `~/Library/Application Support/foliosrv/.env`
/// - Windows: `%LOCALAPPDATA%/foliosrv/.env`
///
/// # Returns
///
/// Returns `Ok(())` once the environment is assembled, or an error if the
/// data directory cannot be created.
///
/// # Example
///
/// ```
/// use foliosrv::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Res<()> {
    dotenv::dotenv().ok();

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("foliosrv/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }
    dotenv::from_path(path).ok();

    Ok(())
}

/// Returns the address the HTTP server binds to.
///
/// Retrieves the `SERVER_ADDRESS` environment variable, falling back to
/// `127.0.0.1:3000` when unset. The value must parse as a socket address.
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "127.0.0.1:3000"
/// ```
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Returns the Spotify API credentials, if fully configured.
///
/// Reads `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and
/// `SPOTIFY_REFRESH_TOKEN`. All three must be present and non-empty for the
/// now-playing feature to reach the live Spotify API; otherwise this returns
/// `None` and the resolver serves its fallback chain only.
///
/// # Security Note
///
/// The client secret and refresh token should be kept confidential and never
/// exposed in logs or version control.
///
/// # Example
///
/// ```
/// if let Some(creds) = spotify_credentials() {
///     println!("Spotify client: {}", creds.client_id);
/// }
/// ```
pub fn spotify_credentials() -> Option<SpotifyCredentials> {
    Some(SpotifyCredentials {
        client_id: non_empty_var("SPOTIFY_CLIENT_ID")?,
        client_secret: non_empty_var("SPOTIFY_CLIENT_SECRET")?,
        refresh_token: non_empty_var("SPOTIFY_REFRESH_TOKEN")?,
    })
}

/// Returns the GitHub API token used for the contributions GraphQL query.
///
/// Checks `GITHUB_CONTRIB_TOKEN`, `GITHUB_TOKEN`, `GITHUB_PAT` and
/// `GITHUB_API_KEY` in that order and returns the first non-empty value.
/// The token needs no scopes beyond public profile read access.
///
/// # Example
///
/// ```
/// match github_token() {
///     Some(_) => println!("contribution stats enabled"),
///     None => println!("contribution stats disabled"),
/// }
/// ```
pub fn github_token() -> Option<String> {
    ["GITHUB_CONTRIB_TOKEN", "GITHUB_TOKEN", "GITHUB_PAT", "GITHUB_API_KEY"]
        .iter()
        .find_map(|name| non_empty_var(name))
}

/// Returns the remote visitor store credentials, if configured.
///
/// Reads `JSONBIN_BIN_ID` and `JSONBIN_API_KEY`. When both are present the
/// visitor counter uses the remote JSON bin as its store of record; when
/// absent it falls back to a local single-slot file.
pub fn jsonbin_credentials() -> Option<KvCredentials> {
    Some(KvCredentials {
        bin_id: non_empty_var("JSONBIN_BIN_ID")?,
        api_key: non_empty_var("JSONBIN_API_KEY")?,
    })
}

/// Returns the Spotify OAuth token exchange URL.
///
/// Retrieves the `SPOTIFY_TOKEN_URL` environment variable, falling back to
/// the public accounts endpoint. Overriding it is only useful for tests and
/// local mock servers.
///
/// # Example
///
/// ```
/// let token_url = spotify_token_url(); // "https://accounts.spotify.com/api/token"
/// ```
pub fn spotify_token_url() -> String {
    env::var("SPOTIFY_TOKEN_URL").unwrap_or_else(|_| DEFAULT_SPOTIFY_TOKEN_URL.to_string())
}

/// Returns the Spotify Web API base URL.
///
/// Retrieves the `SPOTIFY_API_URL` environment variable, falling back to the
/// public API. Player endpoints are appended to this base.
///
/// # Example
///
/// ```
/// let api_url = spotify_api_url(); // "https://api.spotify.com/v1"
/// ```
pub fn spotify_api_url() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_SPOTIFY_API_URL.to_string())
}

/// Returns the GitHub GraphQL endpoint URL.
///
/// Retrieves the `GITHUB_GRAPHQL_URL` environment variable, falling back to
/// the public endpoint.
pub fn github_graphql_url() -> String {
    env::var("GITHUB_GRAPHQL_URL").unwrap_or_else(|_| DEFAULT_GITHUB_GRAPHQL_URL.to_string())
}

/// Returns the base URL of the remote visitor store.
///
/// Retrieves the `JSONBIN_BASE_URL` environment variable, falling back to
/// the public JSONbin v3 API. Bin paths (`/b/{bin}` and `/b/{bin}/latest`)
/// are appended to this base.
pub fn jsonbin_base_url() -> String {
    env::var("JSONBIN_BASE_URL").unwrap_or_else(|_| DEFAULT_JSONBIN_BASE_URL.to_string())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
