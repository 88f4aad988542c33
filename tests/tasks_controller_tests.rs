use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mongodb::Client;
use stockalerts::{config, routes, services, AppState};
use tower::ServiceExt;

async fn test_state(webhook_token: &str) -> AppState {
    let mut settings = config::load();
    settings.finnhub_api_key = String::new();
    settings.sendgrid_api_key = String::new();
    settings.webhook_token = webhook_token.to_string();

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    AppState {
        mongo: client,
        db,
        finnhub: services::finnhub::FinnhubClient::new(String::new()),
        mailer: services::email::EmailClient::new(String::new(), String::new()),
        sessions: services::registry::SessionRegistry::new(),
        settings,
    }
}

#[tokio::test]
async fn process_without_token_is_unauthorized() {
    let state = test_state("topsecret").await;
    let app = routes::app(state);

    let req = Request::builder()
        .method("POST")
        .uri("/tasks/process")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("Invalid webhook token"));
}

#[tokio::test]
async fn process_with_wrong_token_is_unauthorized() {
    let state = test_state("topsecret").await;
    let app = routes::app(state);

    let req = Request::builder()
        .method("POST")
        .uri("/tasks/process")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn process_is_disabled_when_no_token_configured() {
    let state = test_state("").await;
    let app = routes::app(state);

    let req = Request::builder()
        .method("POST")
        .uri("/tasks/process")
        .header(header::AUTHORIZATION, "Bearer anything")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
