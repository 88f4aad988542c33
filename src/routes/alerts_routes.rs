use axum::{routing::{delete, get, post}, Router};
use crate::{controllers::alerts_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/alerts", get(alerts_controller::get_alerts))
        .route("/alerts/create", post(alerts_controller::post_create_alert))
        .route("/alerts/:id/history", get(alerts_controller::get_alert_history))
        .route("/alerts/:id", delete(alerts_controller::delete_alert))
}
