//! # GitHub Integration Module
//!
//! This module fetches contribution statistics for a GitHub user through the
//! GraphQL API and reshapes them for the portfolio's calendar heatmap: a flat
//! day-by-day list of counts for the last year, the calendar total, and a
//! breakdown by contribution kind.
//!
//! ## Overview
//!
//! A single authenticated GraphQL query covers everything the heatmap needs.
//! The query window always spans the 364 days up to now so the flattened grid
//! lines up with GitHub's own profile calendar, and the calendar total is
//! reported as-is rather than recomputed, because GitHub counts contribution
//! kinds (discussions, repository creation) that the breakdown fields do not.
//!
//! Responses are memoized per username for five minutes; the portfolio page
//! re-requests the data on every visit and the upstream numbers move slowly.
//!
//! ## Dependencies
//!
//! - **reqwest** - HTTP client for the GraphQL POST
//! - **chrono** - query window timestamps
//!
//! ## Related Modules
//!
//! - [`crate::api`] - the `/contribution-stats` endpoint served from this client
//! - [`crate::types`] - GraphQL request/response models and the stats shape

pub mod contributions;

pub use contributions::GithubClient;
