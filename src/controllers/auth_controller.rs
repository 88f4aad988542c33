use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::{services::auth_service, AppState};

fn is_valid_email(email: &str) -> bool {
    let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex");
    re.is_match(email)
}

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

#[derive(Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
}

// POST /auth/register
pub async fn post_register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Response {
    let email = body.email.trim().to_lowercase();
    let password = body.password.trim().to_string();

    if email.is_empty() || !is_valid_email(&email) {
        return detail(StatusCode::BAD_REQUEST, "Invalid email address");
    }
    if password.len() < 6 {
        return detail(StatusCode::BAD_REQUEST, "Password must be at least 6 characters");
    }

    match auth_service::register_user(&state, &email, &password).await {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({ "id": user.id.to_hex(), "email": user.email })),
        )
            .into_response(),
        Err(e) if e == "Email already registered" => detail(StatusCode::BAD_REQUEST, &e),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

// POST /auth/login
pub async fn post_login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> Response {
    let email = body.email.trim().to_lowercase();
    let password = body.password.trim().to_string();

    if email.is_empty() || password.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Invalid login credentials");
    }

    let user = match auth_service::login_user(&state, &email, &password).await {
        Ok(u) => u,
        Err(e) => return detail(StatusCode::BAD_REQUEST, &e),
    };

    let token = match auth_service::make_jwt(&state, &user.id) {
        Ok(t) => t,
        Err(e) => return detail(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    (
        StatusCode::OK,
        Json(json!({
            "access_token": token,
            "token_type": "bearer",
            "user": { "id": user.id.to_hex(), "email": user.email },
        })),
    )
        .into_response()
}
