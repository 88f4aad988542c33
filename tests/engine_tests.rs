//! Full evaluation-pass tests against a local MongoDB, with the price
//! oracle stubbed by an in-process HTTP server.

use std::collections::HashMap;
use std::sync::OnceLock;

use axum::{
    extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};
use serde_json::json;
use stockalerts::{
    config,
    models::{Alert, AlertHistory, Direction},
    services::{self, engine::PassOutcome, finnhub::FinnhubClient},
    AppState,
};

// Passes scan every untriggered alert in the database, so tests that run
// a pass must not interleave.
fn pass_lock() -> &'static tokio::sync::Mutex<()> {
    static LOCK: OnceLock<tokio::sync::Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| tokio::sync::Mutex::new(()))
}

/// Oracle stub: symbols starting with LIMIT answer 429, everything else
/// quotes at 185.0.
async fn quote_stub(Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
    let symbol = params.get("symbol").map(String::as_str).unwrap_or("");

    if symbol.starts_with("LIMIT") {
        (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response()
    } else {
        Json(json!({ "c": 185.0 })).into_response()
    }
}

async fn spawn_oracle() -> String {
    let app = Router::new().route("/quote", get(quote_stub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test oracle");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

async fn test_state(oracle_base: String) -> AppState {
    let mut settings = config::load();
    settings.sendgrid_api_key = String::new();

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    AppState {
        mongo: client,
        db,
        finnhub: FinnhubClient::with_base_url(String::new(), oracle_base),
        mailer: services::email::EmailClient::new(String::new(), String::new()),
        sessions: services::registry::SessionRegistry::new(),
        settings,
    }
}

async fn wipe_alerts(state: &AppState) {
    state
        .db
        .collection::<Alert>("alerts")
        .delete_many(doc! {}, None)
        .await
        .expect("wipe alerts");
    state
        .db
        .collection::<AlertHistory>("alert_history")
        .delete_many(doc! {}, None)
        .await
        .expect("wipe alert history");
}

async fn seed_alert(
    state: &AppState,
    user_id: ObjectId,
    symbol: &str,
    target: f64,
    direction: Direction,
    created_at: i64,
) -> ObjectId {
    let alert = Alert {
        id: ObjectId::new(),
        user_id,
        symbol: symbol.to_string(),
        target_price: target,
        direction,
        is_triggered: false,
        created_at,
    };

    state
        .db
        .collection::<Alert>("alerts")
        .insert_one(&alert, None)
        .await
        .expect("seed alert");

    alert.id
}

async fn load_alert(state: &AppState, id: ObjectId) -> Alert {
    state
        .db
        .collection::<Alert>("alerts")
        .find_one(doc! { "_id": id }, None)
        .await
        .expect("load alert")
        .expect("alert exists")
}

async fn history_count(state: &AppState, alert_id: ObjectId) -> u64 {
    state
        .db
        .collection::<AlertHistory>("alert_history")
        .count_documents(doc! { "alert_id": alert_id }, None)
        .await
        .expect("count history")
}

#[tokio::test]
async fn triggered_alert_commits_before_the_event_goes_out() {
    let _guard = pass_lock().lock().await;

    let base = spawn_oracle().await;
    let state = test_state(base).await;
    wipe_alerts(&state).await;

    let user = ObjectId::new();
    let alert_id = seed_alert(&state, user, "AAPL", 180.0, Direction::Above, 1).await;

    let (_sid, mut rx) = state.sessions.register(user);

    let outcome = services::engine::run_pass(&state).await.expect("run pass");
    assert_eq!(
        outcome,
        PassOutcome::Completed {
            processed: 1,
            triggered: 1
        }
    );

    // The frame was published during the pass, so it must already be
    // waiting, and by then the row must already read triggered.
    let frame = rx.try_recv().expect("one frame delivered");
    let event: serde_json::Value = serde_json::from_str(&frame).expect("json frame");
    assert_eq!(event["type"], "alert_triggered");
    assert_eq!(event["symbol"], "AAPL");
    assert_eq!(event["current_price"], 185.0);
    assert_eq!(event["target_price"], 180.0);
    assert_eq!(event["direction"], "above");

    let stored = load_alert(&state, alert_id).await;
    assert!(stored.is_triggered);
    assert_eq!(history_count(&state, alert_id).await, 1);
}

#[tokio::test]
async fn rerun_after_trigger_changes_nothing() {
    let _guard = pass_lock().lock().await;

    let base = spawn_oracle().await;
    let state = test_state(base).await;
    wipe_alerts(&state).await;

    let user = ObjectId::new();
    let alert_id = seed_alert(&state, user, "AAPL", 180.0, Direction::Above, 1).await;

    let first = services::engine::run_pass(&state).await.expect("first pass");
    assert_eq!(
        first,
        PassOutcome::Completed {
            processed: 1,
            triggered: 1
        }
    );

    let (_sid, mut rx) = state.sessions.register(user);

    // The alert is now triggered, so a second pass has nothing to do.
    let second = services::engine::run_pass(&state).await.expect("second pass");
    assert_eq!(
        second,
        PassOutcome::Completed {
            processed: 0,
            triggered: 0
        }
    );

    assert_eq!(history_count(&state, alert_id).await, 1);
    assert!(rx.try_recv().is_err(), "no event on re-run");
}

#[tokio::test]
async fn rate_limit_mid_pass_keeps_earlier_commits_and_skips_the_rest() {
    let _guard = pass_lock().lock().await;

    let base = spawn_oracle().await;
    let state = test_state(base).await;
    wipe_alerts(&state).await;

    let user = ObjectId::new();
    // Oldest first: AAPL triggers, LIMITED aborts the pass, MSFT is
    // never reached.
    let first = seed_alert(&state, user, "AAPL", 180.0, Direction::Above, 1).await;
    let second = seed_alert(&state, user, "LIMITED", 50.0, Direction::Above, 2).await;
    let third = seed_alert(&state, user, "MSFT", 100.0, Direction::Above, 3).await;

    let (_sid, mut rx) = state.sessions.register(user);

    let outcome = services::engine::run_pass(&state).await.expect("run pass");
    assert_eq!(
        outcome,
        PassOutcome::RateLimited {
            processed: 1,
            triggered: 1
        }
    );

    // The commit made before the limit stands.
    assert!(load_alert(&state, first).await.is_triggered);
    assert_eq!(history_count(&state, first).await, 1);

    // Everything from the rate-limited alert on is untouched and stays
    // a candidate for the next pass.
    assert!(!load_alert(&state, second).await.is_triggered);
    assert_eq!(history_count(&state, second).await, 0);
    assert!(!load_alert(&state, third).await.is_triggered);
    assert_eq!(history_count(&state, third).await, 0);

    // Exactly one event went out, for the committed alert.
    let frame = rx.try_recv().expect("one frame delivered");
    let event: serde_json::Value = serde_json::from_str(&frame).expect("json frame");
    assert_eq!(event["symbol"], "AAPL");
    assert!(rx.try_recv().is_err(), "no events for unevaluated alerts");
}
