use std::sync::Arc;

use axum::{
    Extension, Json,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{resolver::Resolution, server::AppState};

pub async fn now_playing(Extension(state): Extension<Arc<AppState>>) -> Response {
    match state.resolver.resolve().await {
        Resolution::Track(snapshot) => Json(snapshot).into_response(),
        Resolution::Idle => Json(json!({ "isPlaying": false })).into_response(),
    }
}
