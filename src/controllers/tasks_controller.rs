use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    services::engine::{self, PassOutcome},
    AppState,
};

fn webhook_authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let expected = state.settings.webhook_token.trim();
    if expected.is_empty() {
        // no token configured => webhook disabled
        return false;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim() == expected)
        .unwrap_or(false)
}

// POST /tasks/process
// Webhook-driven evaluation pass. Shares engine::run_pass with the
// in-process scheduler.
pub async fn post_process(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !webhook_authorized(&state, &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid webhook token" })),
        )
            .into_response();
    }

    match engine::run_pass(&state).await {
        Ok(PassOutcome::Completed { processed, triggered }) => (
            StatusCode::OK,
            Json(json!({
                "status": "processed",
                "processed": processed,
                "triggered": triggered,
            })),
        )
            .into_response(),
        Ok(PassOutcome::RateLimited { .. }) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "rate_limit" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": e })),
        )
            .into_response(),
    }
}
