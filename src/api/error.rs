use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Error envelope for the credential-dependent endpoints.
///
/// Rendered as `{"error": "<message>"}` with the matching status code. The
/// message strings are part of the wire contract consumed by the portfolio
/// UI and must stay stable.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing username")]
    MissingUsername,

    #[error("GitHub token is not configured on the server.")]
    GithubTokenMissing,

    #[error("Unable to load contributions.")]
    ContributionsUnavailable,

    #[error("Unable to load visitor count.")]
    VisitorReadFailed,

    #[error("Unable to update visitor count.")]
    VisitorWriteFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUsername => StatusCode::BAD_REQUEST,
            ApiError::GithubTokenMissing
            | ApiError::ContributionsUnavailable
            | ApiError::VisitorReadFailed
            | ApiError::VisitorWriteFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_username_is_a_bad_request() {
        assert_eq!(ApiError::MissingUsername.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingUsername.to_string(), "Missing username");
    }

    #[test]
    fn upstream_failures_are_server_errors() {
        for error in [
            ApiError::GithubTokenMissing,
            ApiError::ContributionsUnavailable,
            ApiError::VisitorReadFailed,
            ApiError::VisitorWriteFailed,
        ] {
            assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn envelope_messages_match_the_ui_contract() {
        assert_eq!(
            ApiError::GithubTokenMissing.to_string(),
            "GitHub token is not configured on the server."
        );
        assert_eq!(
            ApiError::ContributionsUnavailable.to_string(),
            "Unable to load contributions."
        );
    }
}
