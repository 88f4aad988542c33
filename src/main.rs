use std::net::SocketAddr;

use mongodb::Client;

use stockalerts::{config, routes, services, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = services::db_init::ensure_indexes(&db).await {
        tracing::warn!(error = %e, "index creation failed");
    }

    let state = AppState {
        mongo: client,
        db,
        finnhub: services::finnhub::FinnhubClient::new(settings.finnhub_api_key.clone()),
        mailer: services::email::EmailClient::new(
            settings.sendgrid_api_key.clone(),
            settings.email_from.clone(),
        ),
        sessions: services::registry::SessionRegistry::new(),
        settings: settings.clone(),
    };

    // background evaluation passes on a fixed cadence
    services::alert_monitor::spawn_price_alert_monitor(state.clone());

    let app = routes::app(state.clone());

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().expect("valid HOST"),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind");

    let sessions = state.sessions.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            // close every live WS session before exiting
            sessions.shutdown();
        })
        .await
        .expect("server error");
}
