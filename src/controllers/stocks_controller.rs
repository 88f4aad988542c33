use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::CurrentUser,
    services::stocks_service::{self, HistoryError},
};

fn default_period() -> String {
    "7d".to_string()
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub symbol: String,

    #[serde(default = "default_period")]
    pub period: String,
}

// GET /stock/history?symbol=AAPL&period=7d
pub async fn get_stock_history(
    Extension(_user): Extension<CurrentUser>,
    Query(q): Query<HistoryQuery>,
) -> Response {
    let symbol = q.symbol.trim().to_string();
    if symbol.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Symbol is required" })),
        )
            .into_response();
    }

    match stocks_service::fetch_history(&symbol, &q.period).await {
        Ok(candles) => (StatusCode::OK, Json(json!(candles))).into_response(),
        Err(HistoryError::InvalidPeriod) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Invalid period" })),
        )
            .into_response(),
        Err(HistoryError::UpstreamBlocked) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "detail": "Yahoo Finance API blocked the request" })),
        )
            .into_response(),
        Err(HistoryError::NoChartData) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "No chart data available" })),
        )
            .into_response(),
    }
}
