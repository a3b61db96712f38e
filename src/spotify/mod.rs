//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API player endpoints
//! used by the now-playing feature. It handles HTTP communication, bearer
//! authentication via the token cache, timeout bounding and status-code
//! classification, and exposes the result as plain Rust types for the
//! resolver to interpret.
//!
//! ## Overview
//!
//! Only two read operations exist: the currently-playing lookup and the
//! recently-played history (limited to the single most recent item). Both are
//! account-scoped and require an access token obtained from a long-lived
//! refresh token; see [`crate::management::TokenManager`] for the refresh
//! strategy.
//!
//! ## Architecture
//!
//! ```text
//! Resolver (fallback pipeline)
//!          ↓
//! PlayerSource trait
//!     └── SpotifyClient
//!          ├── Token Cache (refresh-token grant)
//!          └── Player endpoints (currently-playing, recently-played)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! The resolver depends on the [`PlayerSource`] trait rather than the
//! concrete client, so the fallback pipeline can be exercised with a scripted
//! source in tests while production wiring uses [`SpotifyClient`].
//!
//! ## Status Classification
//!
//! The currently-playing endpoint is unusual in that three distinct upstream
//! shapes are all "successful" requests:
//!
//! - **200 with a track item** - live playback data
//! - **200 with a null item** - a session exists but nothing is loaded
//! - **204** - nothing playing at all
//!
//! [`PlaybackStatus`] preserves these distinctions instead of flattening them
//! into an error, because the resolver chooses a different fallback stage for
//! each. Error statuses (4xx/5xx) are reported as [`PlaybackStatus::Failed`]
//! with the status code, again without failing the call itself; only
//! transport-level problems (timeouts, connection failures, token refresh
//! failures) surface as errors.
//!
//! ## Timeouts
//!
//! Every request is bounded to three seconds. The portfolio UI polls this
//! data on page load; a slow upstream must degrade to cached data instead of
//! holding the request open.
//!
//! ## API Coverage
//!
//! - `GET /me/player/currently-playing` - live playback state
//! - `GET /me/player/recently-played?limit=1` - most recent playback event
//!
//! ## Dependencies
//!
//! - **reqwest** - HTTP client with JSON support and async capabilities
//! - **async-trait** - object-safe async methods on [`PlayerSource`]
//!
//! ## Related Modules
//!
//! - [`crate::resolver`] - consumes these calls through the trait
//! - [`crate::management`] - token cache and the persistent track cache
//! - [`crate::types`] - response models for both endpoints

pub mod player;

pub use player::{PlaybackStatus, PlayerSource, SpotifyClient};
