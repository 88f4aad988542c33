use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use stockalerts::services::finnhub::{FinnhubClient, QuoteOutcome};

async fn spawn_oracle(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test oracle");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn quote_with_price_classifies_as_price() {
    let app = Router::new().route(
        "/quote",
        get(|| async { Json(json!({ "c": 185.0, "d": 1.2, "pc": 183.8 })) }),
    );
    let base = spawn_oracle(app).await;

    let client = FinnhubClient::with_base_url("test-key".into(), base);
    assert_eq!(client.quote("AAPL").await, QuoteOutcome::Price(185.0));
}

#[tokio::test]
async fn http_429_classifies_as_rate_limited() {
    let app = Router::new().route(
        "/quote",
        get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response() }),
    );
    let base = spawn_oracle(app).await;

    let client = FinnhubClient::with_base_url("test-key".into(), base);
    assert_eq!(client.quote("AAPL").await, QuoteOutcome::RateLimited);
}

#[tokio::test]
async fn missing_price_field_classifies_as_no_data() {
    let app = Router::new().route("/quote", get(|| async { Json(json!({ "d": 1.0 })) }));
    let base = spawn_oracle(app).await;

    let client = FinnhubClient::with_base_url("test-key".into(), base);
    assert_eq!(client.quote("NOPE").await, QuoteOutcome::NoData);
}

#[tokio::test]
async fn zero_price_classifies_as_no_data() {
    // Finnhub reports c=0 for unknown symbols
    let app = Router::new().route("/quote", get(|| async { Json(json!({ "c": 0.0 })) }));
    let base = spawn_oracle(app).await;

    let client = FinnhubClient::with_base_url("test-key".into(), base);
    assert_eq!(client.quote("ZZZZ").await, QuoteOutcome::NoData);
}

#[tokio::test]
async fn server_error_classifies_as_transport_error() {
    let app = Router::new().route(
        "/quote",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
    );
    let base = spawn_oracle(app).await;

    let client = FinnhubClient::with_base_url("test-key".into(), base);
    match client.quote("AAPL").await {
        QuoteOutcome::TransportError(_) => {}
        other => panic!("expected TransportError, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_classifies_as_transport_error() {
    // nothing listens on this port
    let client = FinnhubClient::with_base_url("test-key".into(), "http://127.0.0.1:9".into());

    match client.quote("AAPL").await {
        QuoteOutcome::TransportError(_) => {}
        other => panic!("expected TransportError, got {other:?}"),
    }
}
