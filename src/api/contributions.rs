use std::{collections::HashMap, sync::Arc};

use axum::{Extension, Json, extract::Query};

use crate::{api::ApiError, server::AppState, types::ContributionStats, warning};

pub async fn contribution_stats(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ContributionStats>, ApiError> {
    let username = params
        .get("username")
        .filter(|username| !username.is_empty())
        .ok_or(ApiError::MissingUsername)?;

    if !state.github.has_token() {
        return Err(ApiError::GithubTokenMissing);
    }

    match state.github.contributions(username).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            warning!("Contribution lookup for {} failed: {}", username, e);
            Err(ApiError::ContributionsUnavailable)
        }
    }
}
