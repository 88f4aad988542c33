use axum::{routing::get, Router};
use crate::{controllers::realtime_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/ws/alerts/:user_id", get(realtime_controller::ws_alerts))
}
