use std::sync::Arc;

use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::{
    api::ApiError, error::UpstreamError, server::AppState, types::VisitorCount, warning,
};

pub async fn visitor_count(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    match state.visitors.current().await {
        Ok(data) => Ok(Json(json!({ "count": data.count }))),
        Err(e) => {
            warning!("Visitor count read failed: {}", e);
            Err(ApiError::VisitorReadFailed)
        }
    }
}

pub async fn bump_visitor_count(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    match state.visitors.increment().await {
        Ok(data) => Ok(Json(json!({ "count": data.count }))),
        Err(e) => {
            warning!("Visitor count update failed: {}", e);
            Err(ApiError::VisitorWriteFailed)
        }
    }
}

// Raw record passthrough for clients talking to the remote store directly.
// Failures answer 500 with a default record instead of the error envelope.
pub async fn kv_record(Extension(state): Extension<Arc<AppState>>) -> Response {
    let Some(store) = state.kv.as_ref() else {
        return fallback_record();
    };

    match store.read().await {
        Ok(record) => Json(record).into_response(),
        Err(e) => {
            warning!("Remote visitor store read failed: {}", e);
            fallback_record()
        }
    }
}

pub async fn put_kv_record(
    Extension(state): Extension<Arc<AppState>>,
    Json(record): Json<VisitorCount>,
) -> Response {
    let outcome = match state.kv.as_ref() {
        Some(store) => store.write(&record).await,
        None => Err(UpstreamError::MissingCredentials("jsonbin")),
    };

    match outcome {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e) => {
            warning!("Remote visitor store write failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to save" })),
            )
                .into_response()
        }
    }
}

fn fallback_record() -> Response {
    let record = VisitorCount {
        count: 0,
        last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(record)).into_response()
}
