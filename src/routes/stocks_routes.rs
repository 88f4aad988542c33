use axum::{routing::get, Router};
use crate::{controllers::stocks_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/stock/history", get(stocks_controller::get_stock_history))
}
