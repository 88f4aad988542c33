use axum::{routing::post, Router};
use crate::{controllers::tasks_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/tasks/process", post(tasks_controller::post_process))
}
