use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{controllers::home_controller, AppState};

pub mod home_routes;
pub mod auth_routes;
pub mod alerts_routes;
pub mod stocks_routes;
pub mod tasks_routes;
pub mod realtime_routes;

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .settings
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = auth_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);
    let router = stocks_routes::add_routes(router);
    let router = tasks_routes::add_routes(router);
    let router = realtime_routes::add_routes(router);

    // CORS outermost so preflight requests never reach the auth check
    router
        .fallback(home_controller::not_found)
        .layer(from_fn_with_state(state.clone(), crate::auth::require_auth))
        .layer(from_fn_with_state(state.clone(), crate::auth::inject_current_user))
        .layer(cors_layer(&state))
        .with_state(state)
}
