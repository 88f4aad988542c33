use axum::{routing::get, Router};
use crate::{controllers::home_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(home_controller::root))
        .route("/health", get(home_controller::health))
        .route("/health/db", get(home_controller::health_db))
}
