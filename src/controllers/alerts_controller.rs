use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{Alert, AlertHistory, CurrentUser, Direction},
    services::alerts_service,
    AppState,
};

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

fn alert_json(a: &Alert) -> serde_json::Value {
    json!({
        "id": a.id.to_hex(),
        "symbol": a.symbol,
        "target_price": a.target_price,
        "direction": a.direction.as_str(),
        "is_triggered": a.is_triggered,
        "created_at": a.created_at,
    })
}

fn history_json(h: &AlertHistory) -> serde_json::Value {
    json!({
        "id": h.id.to_hex(),
        "alert_id": h.alert_id.to_hex(),
        "triggered_price": h.triggered_price,
        "triggered_at": h.triggered_at,
    })
}

#[derive(Deserialize)]
pub struct CreateAlertBody {
    pub symbol: String,
    pub target_price: f64,
    pub direction: Direction,
}

// POST /alerts/create
pub async fn post_create_alert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateAlertBody>,
) -> Response {
    let symbol = body.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Symbol is required");
    }

    if !body.target_price.is_finite() || body.target_price <= 0.0 {
        return detail(StatusCode::BAD_REQUEST, "Target price must be a positive number");
    }

    match alerts_service::create_alert(&state, user.id, &symbol, body.direction, body.target_price)
        .await
    {
        Ok(alert) => (StatusCode::OK, Json(alert_json(&alert))).into_response(),
        Err(e) if e.contains("already exists") => detail(StatusCode::BAD_REQUEST, &e),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

// GET /alerts
pub async fn get_alerts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    match alerts_service::list_user_alerts(&state, user.id).await {
        Ok(alerts) => {
            let items: Vec<_> = alerts.iter().map(alert_json).collect();
            (StatusCode::OK, Json(json!(items))).into_response()
        }
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

// GET /alerts/:id/history
pub async fn get_alert_history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    let oid = match ObjectId::parse_str(&id) {
        Ok(x) => x,
        Err(_) => return detail(StatusCode::BAD_REQUEST, "Invalid alert id"),
    };

    match alerts_service::list_alert_history(&state, user.id, oid).await {
        Ok(Some(items)) => {
            let items: Vec<_> = items.iter().map(history_json).collect();
            (StatusCode::OK, Json(json!(items))).into_response()
        }
        Ok(None) => detail(StatusCode::NOT_FOUND, "Alert not found"),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

// DELETE /alerts/:id
pub async fn delete_alert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    let oid = match ObjectId::parse_str(&id) {
        Ok(x) => x,
        Err(_) => return detail(StatusCode::BAD_REQUEST, "Invalid alert id"),
    };

    match alerts_service::delete_alert(&state, user.id, oid).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "status": "deleted", "alert_id": id })),
        )
            .into_response(),
        Ok(false) => detail(StatusCode::NOT_FOUND, "Alert not found"),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}
