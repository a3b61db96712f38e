//! # API Module
//!
//! This module provides the HTTP endpoints served by the portfolio backend.
//! Each endpoint is a thin proxy over one upstream integration with explicit
//! degradation behavior.
//!
//! ## Overview
//!
//! The API module is the web interface layer of the backend. It provides
//! HTTP endpoints that handle:
//!
//! - **Now Playing**: the Spotify fallback pipeline rendered as a track
//!   snapshot, or `{"isPlaying": false}` when nothing is known
//! - **Contribution Stats**: GitHub contribution calendar data reshaped for
//!   the portfolio heatmap
//! - **Visitor Counter**: read and increment operations over the configured
//!   visitor store, plus raw passthrough access to the remote record
//! - **Health Monitoring**: a health check endpoint for system monitoring
//!   and deployment verification
//!
//! ## Endpoints
//!
//! ### Content
//!
//! - [`now_playing`] - `GET /now-playing`, always answers 200 with the best
//!   available snapshot; upstream failures degrade through the resolver's
//!   fallback chain instead of surfacing
//! - [`contribution_stats`] - `GET /contribution-stats?username=...`,
//!   answers 400 without a username and a fixed error envelope when the
//!   token is missing or GitHub cannot be read
//!
//! ### Visitors
//!
//! - [`visitor_count`] - `GET /visitor-count`, current count
//! - [`bump_visitor_count`] - `POST /visitor-count`, post-increment count
//! - [`kv_record`] / [`put_kv_record`] - `GET`/`POST /kv-visitors`, raw
//!   record passthrough to the remote store
//!
//! ### Monitoring
//!
//! - [`health`] - application status and version information for monitoring
//!   systems and load balancers
//!
//! ## Error Shape
//!
//! Failing endpoints answer with a fixed JSON envelope, `{"error": "..."}`,
//! carried by [`ApiError`]. The now-playing endpoint never uses it; its
//! contract is to always produce a renderable answer.
//!
//! ## Architecture
//!
//! The module is built using the [Axum](https://docs.rs/axum) web framework.
//! Each endpoint is implemented as an async function that receives shared
//! application state through an extension layer; see [`crate::server`] for
//! the routing table and state construction.
//!
//! ## Related Modules
//!
//! - [`crate::resolver`] - now-playing fallback pipeline
//! - [`crate::github`] - contribution statistics client
//! - [`crate::management`] - visitor stores and caches

mod contributions;
mod error;
mod health;
mod now_playing;
mod visitors;

pub use contributions::contribution_stats;
pub use error::ApiError;
pub use health::health;
pub use now_playing::now_playing;
pub use visitors::{bump_visitor_count, kv_record, put_kv_record, visitor_count};
